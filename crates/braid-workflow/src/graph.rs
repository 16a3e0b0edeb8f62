use std::collections::{HashMap, HashSet};

/// Graph structure for traversal and analysis.
#[derive(Debug, Clone, Default)]
pub struct Graph {
  /// Adjacency list: step -> ordered list of downstream steps.
  adjacency: HashMap<String, Vec<String>>,
  /// Step -> designated error handler.
  error_handlers: HashMap<String, String>,
  /// Steps with no incoming forward or error connection, in declaration
  /// order.
  entry_points: Vec<String>,
}

impl Graph {
  /// Build a graph from step names (declaration order), forward connections
  /// and error connections. Connections are kept in the order given.
  pub fn new(
    steps: &[String],
    connections: &[(String, String)],
    error_connections: &[(String, String)],
  ) -> Self {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    for step in steps {
      adjacency.entry(step.clone()).or_default();
    }
    for (from, to) in connections {
      adjacency.entry(from.clone()).or_default().push(to.clone());
    }

    let targets: HashSet<&str> = connections
      .iter()
      .chain(error_connections)
      .map(|(_, to)| to.as_str())
      .collect();

    let entry_points: Vec<String> = steps
      .iter()
      .filter(|id| !targets.contains(id.as_str()))
      .cloned()
      .collect();

    Self {
      adjacency,
      error_handlers: error_connections.iter().cloned().collect(),
      entry_points,
    }
  }

  /// Get entry points (steps nothing connects to).
  pub fn entry_points(&self) -> &[String] {
    &self.entry_points
  }

  /// Get downstream steps of `step`, in connection order.
  pub fn downstream(&self, step: &str) -> &[String] {
    self
      .adjacency
      .get(step)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get the error handler designated for `step`, if any.
  pub fn error_handler(&self, step: &str) -> Option<&str> {
    self.error_handlers.get(step).map(String::as_str)
  }

  /// Find a cycle over forward and error connections, if there is one.
  ///
  /// Returns the steps on the cycle in traversal order, starting and
  /// ending with the same step.
  pub fn find_cycle(&self) -> Option<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
      InProgress,
      Done,
    }

    fn visit<'a>(
      graph: &'a Graph,
      step: &'a str,
      marks: &mut HashMap<&'a str, Mark>,
      path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
      marks.insert(step, Mark::InProgress);
      path.push(step);

      let next = graph
        .downstream(step)
        .iter()
        .map(String::as_str)
        .chain(graph.error_handler(step));

      for child in next {
        match marks.get(child) {
          Some(Mark::InProgress) => {
            let start = path.iter().position(|s| *s == child).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
            cycle.push(child.to_string());
            return Some(cycle);
          }
          Some(Mark::Done) => {}
          None => {
            if let Some(cycle) = visit(graph, child, marks, path) {
              return Some(cycle);
            }
          }
        }
      }

      path.pop();
      marks.insert(step, Mark::Done);
      None
    }

    let mut roots: Vec<&str> = self.adjacency.keys().map(String::as_str).collect();
    roots.sort_unstable();

    let mut marks = HashMap::new();
    for root in roots {
      if !marks.contains_key(root) {
        let mut path = Vec::new();
        if let Some(cycle) = visit(self, root, &mut marks, &mut path) {
          return Some(cycle);
        }
      }
    }
    None
  }
}
