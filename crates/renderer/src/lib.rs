//! Flowchart rendering infrastructure.
//!
//! Defines the [`FlowchartRenderer`] seam consumed by the diagram service and
//! its Graphviz implementation, [`GraphvizRenderer`], which writes a DOT source
//! file next to the output, runs `dot -Tjpg`, and removes the source file.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Process spawning and file I/O live here. Node shapes are
//! passed to Graphviz unchanged; an unknown shape is Graphviz's problem to
//! report.

mod dot;
mod graphviz;

use std::path::PathBuf;

use async_trait::async_trait;
use flowchart::GraphDescription;
use thiserror::Error;

pub use dot::to_dot;
pub use graphviz::GraphvizRenderer;

/// Errors produced while rendering a flowchart.
///
/// All variants are internal failures from the caller's point of view; no
/// partially written output is cleaned up.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing the DOT source or removing it failed.
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The renderer binary could not be started.
    #[error("failed to run '{}': {source}", program.display())]
    Spawn {
        /// The binary that was invoked.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The renderer binary exited unsuccessfully.
    #[error("'{}' exited with {status}: {stderr}", program.display())]
    Failed {
        /// The binary that was invoked.
        program: PathBuf,
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
}

/// Turns a graph description into an image file.
#[async_trait]
pub trait FlowchartRenderer: Send + Sync {
    /// Renders `graph` and returns the path of the written image.
    ///
    /// Implementations may write to a fixed path; callers that render
    /// concurrently must serialise render-then-read themselves.
    async fn render(&self, graph: &GraphDescription) -> Result<PathBuf, RenderError>;
}
