//! Bridge to the external converter binary.
//!
//! The converter does tone mapping, dithering to the device palette,
//! and rotation. It always receives the NATIVE panel dimension; when
//! the composed input is in the logical (possibly swapped) geometry it
//! detects the mismatch and rotates — that is the single place
//! rotation happens.

use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::{Duration, Instant};

use framecast_core::error::CoreError;
use framecast_core::processing::{dimension_value, OPT_DIMENSION};
use image::DynamicImage;
use tokio::process::Command;

/// Invokes the converter with a composed image and an option map.
#[derive(Debug, Clone)]
pub struct ProcessingBridge {
    bin: String,
    timeout: Duration,
}

impl ProcessingBridge {
    pub fn new(bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    /// Run the converter. Returns the processed PNG bytes plus the
    /// preview thumbnail when the converter produced one.
    pub async fn process(
        &self,
        composed: &DynamicImage,
        native_w: i64,
        native_h: i64,
        extra_options: &BTreeMap<String, String>,
    ) -> Result<(Vec<u8>, Option<Vec<u8>>), CoreError> {
        let mut options = extra_options.clone();
        options.insert(
            OPT_DIMENSION.to_string(),
            dimension_value(native_w, native_h),
        );

        let workdir = tempfile::tempdir()
            .map_err(|e| CoreError::Internal(format!("failed to create temp dir: {e}")))?;
        let input_path = workdir.path().join("input.png");
        let output_path = workdir.path().join("output.png");
        let thumb_path = workdir.path().join("thumbnail.jpg");

        // Hand the input over as a file; the converter streams it back
        // as files too.
        let mut input_bytes = Vec::new();
        composed
            .write_to(
                &mut std::io::Cursor::new(&mut input_bytes),
                image::ImageFormat::Png,
            )
            .map_err(|e| CoreError::Internal(format!("failed to encode input image: {e}")))?;
        tokio::fs::write(&input_path, &input_bytes)
            .await
            .map_err(|e| CoreError::Internal(format!("failed to write input image: {e}")))?;

        let mut cmd = Command::new(&self.bin);
        cmd.arg("--input")
            .arg(&input_path)
            .arg("--output")
            .arg(&output_path)
            .arg("--thumbnail")
            .arg(&thumb_path);
        for (key, value) in &options {
            cmd.arg(format!("--{key}")).arg(value);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Killed when dropped, i.e. when the timeout fires.
            .kill_on_drop(true);

        tracing::debug!(bin = %self.bin, ?options, "Invoking converter");

        let start = Instant::now();
        let run = cmd.output();
        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(CoreError::Processor(format!(
                    "failed to run {}: {e}",
                    self.bin
                )))
            }
            Err(_elapsed) => {
                return Err(CoreError::Timeout {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::Processor(format!(
                "exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let processed = tokio::fs::read(&output_path).await.map_err(|e| {
            CoreError::Processor(format!("converter produced no output: {e}"))
        })?;

        let thumbnail = match tokio::fs::read(&thumb_path).await {
            Ok(bytes) if !bytes.is_empty() => Some(bytes),
            _ => None,
        };

        Ok((processed, thumbnail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn one_pixel() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::new(4, 4))
    }

    #[tokio::test]
    async fn test_missing_binary_is_processor_error() {
        let bridge = ProcessingBridge::new(
            "/nonexistent/epaper-image-convert",
            Duration::from_secs(5),
        );
        let err = bridge
            .process(&one_pixel(), 800, 480, &BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Processor(_)));
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr() {
        // `false` exits 1 without reading its arguments.
        let bridge = ProcessingBridge::new("false", Duration::from_secs(5));
        let err = bridge
            .process(&one_pixel(), 800, 480, &BTreeMap::new())
            .await
            .unwrap_err();
        match err {
            CoreError::Processor(msg) => assert!(msg.contains("exit code")),
            other => panic!("expected Processor error, got {other:?}"),
        }
    }

    /// Write an executable stand-in converter script for tests.
    fn fake_converter(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-convert.sh");
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    const PASSTHROUGH: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --input) IN="$2"; shift 2;;
    --output) OUT="$2"; shift 2;;
    --thumbnail) THUMB="$2"; shift 2;;
    *) shift;;
  esac
done
cp "$IN" "$OUT"
printf 'thumb' > "$THUMB"
"#;

    #[tokio::test]
    async fn test_passthrough_converter_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = ProcessingBridge::new(
            fake_converter(dir.path(), PASSTHROUGH),
            Duration::from_secs(5),
        );
        let (processed, thumb) = bridge
            .process(&one_pixel(), 800, 480, &BTreeMap::new())
            .await
            .unwrap();
        // Output is the PNG we handed in; thumbnail came back too.
        assert!(image::load_from_memory(&processed).is_ok());
        assert_eq!(thumb.as_deref(), Some(&b"thumb"[..]));
    }

    #[tokio::test]
    async fn test_converter_receives_dimension_option() {
        let dir = tempfile::tempdir().unwrap();
        // Echo the argv into the output file so we can assert on it.
        let script = r#"#!/bin/sh
ARGS="$*"
while [ $# -gt 0 ]; do
  case "$1" in
    --output) OUT="$2"; shift 2;;
    *) shift;;
  esac
done
printf '%s' "$ARGS" > "$OUT"
"#;
        let bridge =
            ProcessingBridge::new(fake_converter(dir.path(), script), Duration::from_secs(5));
        let mut extra = BTreeMap::new();
        extra.insert("exposure".to_string(), "1.2".to_string());
        let (argv, _) = bridge
            .process(&one_pixel(), 480, 800, &extra)
            .await
            .unwrap();
        let argv = String::from_utf8(argv).unwrap();
        assert!(argv.contains("--dimension 480x800"), "argv: {argv}");
        assert!(argv.contains("--exposure 1.2"), "argv: {argv}");
    }

    #[tokio::test]
    async fn test_hung_converter_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let script = "#!/bin/sh\nsleep 30\n";
        let bridge = ProcessingBridge::new(
            fake_converter(dir.path(), script),
            Duration::from_millis(200),
        );
        let started = Instant::now();
        let err = bridge
            .process(&one_pixel(), 800, 480, &BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
