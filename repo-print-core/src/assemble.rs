//! Folding retained records into the final artifact.
//!
//! - [`RecordListAssembler`]: the records themselves, with plain renderings stripped.
//! - [`DocumentAssembler`]: one HTML document (style block, collapsible manifest of every
//!   candidate path, one highlighted section per record) plus the ordered matched paths.
//!
//! The document assembler rejects records that were not rendered by the annotated renderer.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::classify::mime_type;
use crate::contract::{CandidatePath, FileRecord, PipelineResult, RenderedContent, SnapshotError};
use crate::render::{escape_html, DOCUMENT_STYLE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    #[default]
    Records,
    Document,
}

impl OutputKind {
    /// `manifest` is every candidate path considered, matched or not.
    pub fn assembler(self, manifest: Vec<CandidatePath>) -> Box<dyn OutputAssembler> {
        match self {
            OutputKind::Records => Box::new(RecordListAssembler),
            OutputKind::Document => Box::new(DocumentAssembler::new(manifest)),
        }
    }
}

pub trait OutputAssembler {
    fn assemble(&self, records: Vec<FileRecord>) -> Result<PipelineResult, SnapshotError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordListAssembler;

impl OutputAssembler for RecordListAssembler {
    fn assemble(&self, records: Vec<FileRecord>) -> Result<PipelineResult, SnapshotError> {
        let records = records
            .into_iter()
            .map(|record| match record.rendered {
                Some(RenderedContent::Plain { .. }) => FileRecord {
                    rendered: None,
                    ..record
                },
                _ => record,
            })
            .collect::<Vec<_>>();
        info!(records = records.len(), "Assembled record list");
        Ok(PipelineResult::Records(records))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    manifest: Vec<CandidatePath>,
}

impl DocumentAssembler {
    pub fn new(manifest: Vec<CandidatePath>) -> Self {
        Self { manifest }
    }
}

impl OutputAssembler for DocumentAssembler {
    fn assemble(&self, records: Vec<FileRecord>) -> Result<PipelineResult, SnapshotError> {
        let mut document = String::new();
        document.push_str(&format!(
            "<html><head><meta charset=\"utf-8\"><style>{}</style></head><body>",
            DOCUMENT_STYLE.as_str()
        ));
        document.push_str("<details><summary>All Files</summary>");
        let manifest = self
            .manifest
            .iter()
            .map(|path| format!("<p>{}</p>", escape_html(path)))
            .collect::<Vec<_>>()
            .join("\n");
        document.push_str(&manifest);
        document.push_str("</details>");

        let mut included_paths = Vec::with_capacity(records.len());
        for record in records {
            let Some(RenderedContent::Annotated { markup, type_tag }) = &record.rendered else {
                error!(path = %record.path, "Document assembly received a record without annotated markup");
                return Err(SnapshotError::AssemblerMismatch);
            };
            document.push_str(&format!(
                "<h2>{}</h2><pre><code class=\"language-{}\" data-mime=\"{}\">{}</code></pre>",
                escape_html(&record.path),
                escape_html(type_tag),
                escape_html(&mime_type(&record.path)),
                markup
            ));
            included_paths.push(record.path);
        }
        document.push_str("</body></html>");

        info!(
            manifest = self.manifest.len(),
            included = included_paths.len(),
            "Assembled document"
        );
        Ok(PipelineResult::Document {
            document,
            included_paths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, rendered: Option<RenderedContent>) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            type_tag: "js".to_string(),
            raw_content: "let a = 1;".to_string(),
            rendered,
        }
    }

    fn annotated(markup: &str) -> Option<RenderedContent> {
        Some(RenderedContent::Annotated {
            markup: markup.to_string(),
            type_tag: "js".to_string(),
        })
    }

    #[test]
    fn record_list_strips_plain_renderings() {
        let plain = Some(RenderedContent::Plain {
            text: "let a = 1;".to_string(),
        });
        let result = RecordListAssembler
            .assemble(vec![record("a.js", plain), record("b.js", annotated("<span>b</span>"))])
            .unwrap();
        let PipelineResult::Records(records) = result else {
            panic!("expected records");
        };
        assert_eq!(records[0].rendered, None);
        assert!(records[1].rendered.as_ref().unwrap().is_annotated());
    }

    #[test]
    fn record_serialises_as_path_extension_content() {
        let json = serde_json::to_value(record("lib/a.js", None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"path": "lib/a.js", "extension": "js", "content": "let a = 1;"})
        );
    }

    #[test]
    fn document_lists_manifest_and_sections_in_order() {
        let assembler = DocumentAssembler::new(vec![
            "lib/a.js".to_string(),
            "lib/b.js".to_string(),
            "lib/<c>.js".to_string(),
        ]);
        let result = assembler
            .assemble(vec![
                record("lib/a.js", annotated("<span>A</span>")),
                record("lib/b.js", annotated("<span>B</span>")),
            ])
            .unwrap();
        let PipelineResult::Document {
            document,
            included_paths,
        } = result
        else {
            panic!("expected document");
        };
        assert_eq!(included_paths, vec!["lib/a.js", "lib/b.js"]);
        assert!(document.starts_with("<html><head>"));
        assert!(document.ends_with("</body></html>"));
        assert!(document.contains("<summary>All Files</summary>"));
        assert!(document.contains("<p>lib/&lt;c&gt;.js</p>"));
        let a = document.find("<h2>lib/a.js</h2>").unwrap();
        let b = document.find("<h2>lib/b.js</h2>").unwrap();
        assert!(a < b);
        assert!(document.contains("<code class=\"language-js\" data-mime=\""));
        assert!(document.contains("\"><span>A</span></code></pre>"));
    }

    #[test]
    fn document_rejects_plain_renderings() {
        let plain = Some(RenderedContent::Plain {
            text: "x".to_string(),
        });
        let err = DocumentAssembler::new(vec![])
            .assemble(vec![record("a.js", plain)])
            .unwrap_err();
        assert!(matches!(err, SnapshotError::AssemblerMismatch));
    }

    #[test]
    fn output_kind_selects_assembler() {
        let result = OutputKind::Records.assembler(vec![]).assemble(vec![]).unwrap();
        assert_eq!(result, PipelineResult::Records(vec![]));
        let result = OutputKind::Document.assembler(vec![]).assemble(vec![]).unwrap();
        assert!(matches!(result, PipelineResult::Document { .. }));
    }
}
