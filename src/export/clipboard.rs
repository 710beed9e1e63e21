//! Clipboard copy with a data-URI text fallback

use crate::error::{Error, Result};
use crate::export::{PNG_MIME, data_uri, png_bytes};
use crate::session::GeneratedCode;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Destination for copied codes
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Write a single binary entry of the given MIME type.
    async fn write_image(&self, mime: &str, data: Bytes) -> Result<()>;

    /// Write plain text.
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Which clipboard entry ended up holding the code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The PNG image itself
    Image,
    /// The PNG data URI as text
    DataUri,
}

impl CopyOutcome {
    /// Notice shown to the user
    pub fn message(self) -> &'static str {
        match self {
            CopyOutcome::Image => "Copied to clipboard!",
            CopyOutcome::DataUri => "Copied as data URL!",
        }
    }
}

/// Copy a code's PNG to the clipboard, falling back to its data URI as text.
///
/// Only when both writes are rejected does this return [`Error::Clipboard`].
pub async fn copy_code<C>(clipboard: &C, code: &GeneratedCode) -> Result<CopyOutcome>
where
    C: Clipboard + ?Sized,
{
    let png = png_bytes(code.surface())?;

    match clipboard.write_image(PNG_MIME, png.clone()).await {
        Ok(()) => Ok(CopyOutcome::Image),
        Err(image_err) => {
            tracing::debug!("Image clipboard write rejected, falling back to data URI: {image_err}");
            match clipboard.write_text(&data_uri(&png)).await {
                Ok(()) => Ok(CopyOutcome::DataUri),
                Err(text_err) => {
                    tracing::error!("Copy failed: {text_err}");
                    Err(Error::Clipboard(
                        "Copy failed. Try downloading instead.".to_string(),
                    ))
                }
            }
        }
    }
}

/// Desktop clipboard tool selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardBackend {
    /// `wl-copy` when `WAYLAND_DISPLAY` is set, `xclip` otherwise
    #[default]
    Auto,
    /// `wl-copy` from wl-clipboard
    Wayland,
    /// `xclip`
    X11,
}

impl ClipboardBackend {
    /// Parse a backend name (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "wayland" | "wl-copy" => Some(Self::Wayland),
            "x11" | "xclip" => Some(Self::X11),
            _ => None,
        }
    }

    fn resolve(self) -> Self {
        match self {
            Self::Auto if std::env::var_os("WAYLAND_DISPLAY").is_some() => Self::Wayland,
            Self::Auto => Self::X11,
            other => other,
        }
    }
}

/// Linux desktop clipboard driven through `wl-copy` or `xclip`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard {
    backend: ClipboardBackend,
}

impl SystemClipboard {
    /// Clipboard using the given backend
    pub fn new(backend: ClipboardBackend) -> Self {
        Self { backend }
    }

    fn command(&self, mime: &str) -> (&'static str, Vec<String>) {
        match self.backend.resolve() {
            ClipboardBackend::Wayland => ("wl-copy", vec!["--type".into(), mime.to_string()]),
            _ => (
                "xclip",
                vec![
                    "-selection".into(),
                    "clipboard".into(),
                    "-t".into(),
                    mime.to_string(),
                    "-i".into(),
                ],
            ),
        }
    }

    async fn pipe(&self, mime: &str, data: &[u8]) -> Result<()> {
        let (program, args) = self.command(mime);

        // Both tools fork a daemon that owns the selection; it must not inherit
        // our pipes or waiting on them would block until the selection changes.
        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Clipboard(format!("Failed to launch {program}: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(data)
                .await
                .map_err(|e| Error::Clipboard(format!("Failed to write to {program}: {e}")))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| Error::Clipboard(format!("{program} did not finish: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Clipboard(format!("{program} exited with {status}")))
        }
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_image(&self, mime: &str, data: Bytes) -> Result<()> {
        self.pipe(mime, &data).await
    }

    async fn write_text(&self, text: &str) -> Result<()> {
        self.pipe("text/plain", text.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentInput, ContentMode};
    use crate::qr::{QrEncoder, RenderSettings};
    use crate::session::generate;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeClipboard {
        reject_image: bool,
        reject_text: bool,
        images: Mutex<Vec<(String, Bytes)>>,
        texts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Clipboard for FakeClipboard {
        async fn write_image(&self, mime: &str, data: Bytes) -> Result<()> {
            if self.reject_image {
                return Err(Error::Clipboard("image writes not permitted".into()));
            }
            self.images.lock().unwrap().push((mime.to_string(), data));
            Ok(())
        }

        async fn write_text(&self, text: &str) -> Result<()> {
            if self.reject_text {
                return Err(Error::Clipboard("text writes not permitted".into()));
            }
            self.texts.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn sample_code() -> GeneratedCode {
        let mut input = ContentInput::with_mode(ContentMode::Url);
        input.url = "example.com".into();
        generate(&input, &RenderSettings::default(), &QrEncoder::new()).unwrap()
    }

    #[tokio::test]
    async fn test_copies_png_entry() {
        let clipboard = FakeClipboard::default();
        let outcome = copy_code(&clipboard, &sample_code()).await.unwrap();

        assert_eq!(outcome, CopyOutcome::Image);
        let images = clipboard.images.lock().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].0, "image/png");
        assert_eq!(&images[0].1[..4], b"\x89PNG");
        assert!(clipboard.texts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_to_data_uri() {
        let clipboard = FakeClipboard {
            reject_image: true,
            ..Default::default()
        };
        let outcome = copy_code(&clipboard, &sample_code()).await.unwrap();

        assert_eq!(outcome, CopyOutcome::DataUri);
        assert_eq!(outcome.message(), "Copied as data URL!");
        let texts = clipboard.texts.lock().unwrap();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_both_rejected_surfaces_notice() {
        let clipboard = FakeClipboard {
            reject_image: true,
            reject_text: true,
            ..Default::default()
        };
        let result = copy_code(&clipboard, &sample_code()).await;
        match result {
            Err(Error::Clipboard(message)) => assert!(message.contains("Try downloading")),
            other => panic!("expected clipboard error, got {other:?}"),
        }
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(ClipboardBackend::parse("Wayland"), Some(ClipboardBackend::Wayland));
        assert_eq!(ClipboardBackend::parse("xclip"), Some(ClipboardBackend::X11));
        assert!(ClipboardBackend::parse("pasteboard").is_none());
    }

    #[test]
    fn test_explicit_backend_commands() {
        let (program, args) = SystemClipboard::new(ClipboardBackend::Wayland).command("image/png");
        assert_eq!(program, "wl-copy");
        assert_eq!(args, vec!["--type", "image/png"]);

        let (program, args) = SystemClipboard::new(ClipboardBackend::X11).command("text/plain");
        assert_eq!(program, "xclip");
        assert!(args.contains(&"text/plain".to_string()));
    }
}
