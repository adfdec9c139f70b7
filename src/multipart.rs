//! `multipart/form-data` bodies encoded in an arbitrary charset.
//!
//! `reqwest::multipart` always writes UTF-8, but the legacy admin forms
//! expect their text fields in ISO-8859-1, so the body is framed by hand.

use crate::codec::Charset;
use rand::{distributions::Alphanumeric, Rng};

const CRLF: &str = "\r\n";
const BOUNDARY_PREFIX: &str = "----FormBoundary";

/// A file field. The bytes are written verbatim and never pass through the
/// text codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: None,
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(FilePart),
}

/// Ordered set of form fields. Parts are written in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    fields: Vec<(String, FormValue)>,
}

/// A framed body together with the `Content-Type` header announcing it.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub boundary: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormValue::Text(value.into())));
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.fields.push((name.into(), FormValue::File(file)));
        self
    }

    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Frames the form with a fresh random boundary.
    pub fn build(&self, charset: &Charset) -> MultipartBody {
        self.build_with_boundary(charset, generate_boundary())
    }

    fn build_with_boundary(&self, charset: &Charset, boundary: String) -> MultipartBody {
        let mut bytes = Vec::new();

        for (name, value) in &self.fields {
            let mut head = format!("--{boundary}{CRLF}");
            match value {
                FormValue::Text(text) => {
                    head.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{name}\"{CRLF}{CRLF}"
                    ));
                    bytes.extend(charset.encode(&head));
                    bytes.extend(charset.encode(text));
                    bytes.extend(CRLF.as_bytes());
                }
                FormValue::File(file) => {
                    let file_name = file.file_name.as_deref().unwrap_or("blob");
                    let content_type = file.content_type.clone().unwrap_or_else(|| {
                        format!("application/octet-stream; charset={}", charset.label())
                    });
                    head.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"{CRLF}"
                    ));
                    head.push_str(&format!("Content-Type: {content_type}{CRLF}{CRLF}"));
                    bytes.extend(charset.encode(&head));
                    bytes.extend_from_slice(&file.bytes);
                    bytes.extend(CRLF.as_bytes());
                }
            }
        }

        bytes.extend(charset.encode(&format!("--{boundary}--{CRLF}")));

        MultipartBody {
            content_type: format!(
                "multipart/form-data; boundary={boundary}; charset={}",
                charset.label()
            ),
            boundary,
            bytes,
        }
    }
}

fn generate_boundary() -> String {
    let mut rng = rand::thread_rng();
    let token: String = (0..32).map(|_| rng.sample(Alphanumeric) as char).collect();
    format!("{BOUNDARY_PREFIX}{token}")
}
