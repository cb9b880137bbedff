use std::fs;

use tempfile::tempdir;

use naiad_cli::{Args, Command, ShareAction, run};

const SAMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="80">
  <rect x="10" y="10" width="100" height="60" fill="#336699"/>
</svg>"##;

fn args(command: Command) -> Args {
    Args {
        command,
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_export_every_format() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input_path = temp_dir.path().join("diagram.svg");
    fs::write(&input_path, SAMPLE_SVG).expect("Failed to write fixture");

    for format in ["png", "svg", "pdf"] {
        let output_path = temp_dir.path().join(format!("out.{format}"));

        let result = run(&args(Command::Export {
            input: input_path.to_string_lossy().to_string(),
            format: format.to_string(),
            output: Some(output_path.to_string_lossy().to_string()),
            scale: None,
            quality: None,
            background: None,
            name: None,
        }));

        assert!(result.is_ok(), "{format} export failed: {:?}", result.err());
        let written = fs::read(&output_path).expect("Exported file missing");
        assert!(!written.is_empty(), "{format} export produced no bytes");
    }
}

#[test]
fn e2e_export_rejects_unknown_format() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input_path = temp_dir.path().join("diagram.svg");
    fs::write(&input_path, SAMPLE_SVG).expect("Failed to write fixture");

    let result = run(&args(Command::Export {
        input: input_path.to_string_lossy().to_string(),
        format: "bmp".to_string(),
        output: None,
        scale: None,
        quality: None,
        background: None,
        name: None,
    }));

    let err = result.expect_err("bmp must be rejected");
    assert!(err.to_string().contains("Unsupported export format: bmp"));
}

#[test]
fn e2e_share_encode_and_decode() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let source_path = temp_dir.path().join("diagram.mmd");
    fs::write(&source_path, "flowchart TD\nA-->B").expect("Failed to write fixture");

    let encode = run(&args(Command::Share {
        action: ShareAction::Encode {
            input: source_path.to_string_lossy().to_string(),
            base_url: Some("https://diagrams.example/view".to_string()),
        },
    }));
    assert!(encode.is_ok(), "encode failed: {:?}", encode.err());

    // Build a matching link directly and decode it through the CLI path.
    let base = url::Url::parse("https://diagrams.example/view").unwrap();
    let token = naiad::share::encode(&base, "flowchart TD\nA-->B").unwrap();
    let decode = run(&args(Command::Share {
        action: ShareAction::Decode {
            url: token.url().to_string(),
        },
    }));
    assert!(decode.is_ok(), "decode failed: {:?}", decode.err());

    let empty = run(&args(Command::Share {
        action: ShareAction::Decode {
            url: "https://diagrams.example/view".to_string(),
        },
    }));
    assert!(empty.is_err(), "a link without a token must report an error");
}

#[test]
fn e2e_share_clean() {
    let result = run(&args(Command::Share {
        action: ShareAction::Clean {
            url: "https://diagrams.example/view?c=abc&theme=dark".to_string(),
        },
    }));
    assert!(result.is_ok());
}
