/// Configuration for control-flow graph construction.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    // Run `ControlFlowGraph::verify` on every finished graph.
    pub(crate) verify_graphs: bool,
    // Log the GraphViz rendering of every finished graph.
    pub(crate) print_cfg: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            verify_graphs: true,
            print_cfg: false,
        }
    }
}

impl BuildConfig {
    pub fn verify_graphs(self, a: bool) -> Self {
        Self {
            verify_graphs: a,
            ..self
        }
    }

    pub fn print_cfg(self, a: bool) -> Self {
        Self {
            print_cfg: a,
            ..self
        }
    }
}
