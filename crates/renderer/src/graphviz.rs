use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flowchart::GraphDescription;
use tokio::process::Command;

use crate::{to_dot, FlowchartRenderer, RenderError};

/// Renders flowcharts to JPEG with the Graphviz `dot` binary.
///
/// Every render writes `<stem>.gv`, produces `<stem>.jpg`, and removes the
/// `.gv` source, so repeated renders overwrite the same image.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    program: PathBuf,
    output_stem: PathBuf,
}

impl GraphvizRenderer {
    /// Creates a renderer that invokes `program` (usually `"dot"`) and writes
    /// to `output_stem` with `.gv` / `.jpg` extensions.
    pub fn new(program: impl Into<PathBuf>, output_stem: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            output_stem: output_stem.into(),
        }
    }

    /// Path of the rendered image.
    pub fn output_path(&self) -> PathBuf {
        self.output_stem.with_extension("jpg")
    }

    fn source_path(&self) -> PathBuf {
        self.output_stem.with_extension("gv")
    }

    async fn run_dot(&self, source: &Path, output: &Path) -> Result<(), RenderError> {
        let result = Command::new(&self.program)
            .arg("-Tjpg")
            .arg("-o")
            .arg(output)
            .arg(source)
            .output()
            .await
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(RenderError::Failed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FlowchartRenderer for GraphvizRenderer {
    async fn render(&self, graph: &GraphDescription) -> Result<PathBuf, RenderError> {
        let source = self.source_path();
        let output = self.output_path();

        tokio::fs::write(&source, to_dot(graph))
            .await
            .map_err(|e| RenderError::Io {
                path: source.clone(),
                source: e,
            })?;

        let rendered = self.run_dot(&source, &output).await;

        if let Err(e) = tokio::fs::remove_file(&source).await {
            tracing::warn!(path = %source.display(), error = %e, "failed to remove DOT source");
        }

        rendered?;
        tracing::info!(
            path = %output.display(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "flowchart rendered"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowchart::{NodeId, NodeSpec};

    fn single_node(label: &str) -> GraphDescription {
        GraphDescription {
            nodes: vec![NodeSpec {
                id: NodeId::new("A").unwrap(),
                label: label.to_string(),
                shape: "box".to_string(),
            }],
            edges: vec![],
        }
    }

    /// Writes a stand-in for `dot` that copies its input file to the `-o` path.
    #[cfg(unix)]
    fn fake_dot(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-dot");
        std::fs::write(&script, "#!/bin/sh\ncat \"$4\" > \"$3\"\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_overwrites_single_output_and_removes_source() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = GraphvizRenderer::new(fake_dot(dir.path()), dir.path().join("flowchart"));

        let first = renderer.render(&single_node("первый")).await.unwrap();
        let second = renderer.render(&single_node("второй")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, dir.path().join("flowchart.jpg"));

        let content = std::fs::read_to_string(&second).unwrap();
        assert!(content.contains("второй"));
        assert!(!content.contains("первый"));

        let mut entries: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        entries.sort();
        assert_eq!(entries, vec!["fake-dot", "flowchart.jpg"]);
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error_and_cleans_source() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = GraphvizRenderer::new(
            dir.path().join("no-such-dot"),
            dir.path().join("flowchart"),
        );

        let err = renderer.render(&single_node("x")).await.unwrap_err();
        assert!(matches!(err, RenderError::Spawn { .. }));
        assert!(!dir.path().join("flowchart.gv").exists());
        assert!(!dir.path().join("flowchart.jpg").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failed_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("broken-dot");
        std::fs::write(&script, "#!/bin/sh\necho 'syntax error' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let renderer = GraphvizRenderer::new(&script, dir.path().join("flowchart"));
        match renderer.render(&single_node("x")).await.unwrap_err() {
            RenderError::Failed { stderr, .. } => assert_eq!(stderr, "syntax error"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
