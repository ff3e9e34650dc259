// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests of the `filc` binary.
//!
//! Each test lays out sources, include trees and config files in a temporary
//! directory, runs the binary and checks its exit status and streams.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use fil_core::il::{BuiltinType, EntrypointKind, IlBinary, Parameter, call_body, encode};
use fil_core::spirv::SPIRV_MAGIC;
use tempfile::TempDir;

fn filc(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_filc"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn fragment_binary() -> IlBinary {
    let mut il = IlBinary::new();
    let helper = il.add_function("helper", BuiltinType::Void.id(), Vec::new(), &call_body(&[]));
    il.add_entrypoint(
        EntrypointKind::Fragment,
        "main",
        vec![Parameter::new(BuiltinType::Vec4.id(), [])],
        vec![Parameter::new(BuiltinType::Vec4.id(), [])],
        &call_body(&[helper]),
    );
    il
}

// ============================================================================
// Front end
// ============================================================================

#[test]
fn check_clean_source_succeeds() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.fsl", "void main() { return; }\n");

    let output = filc(temp.path(), &["check", "main.fsl"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).is_empty());
}

#[test]
fn check_resolves_includes_through_config() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "common/light.fsl", "void light() { return; }\n");
    write(
        temp.path(),
        "fil.toml",
        "[preprocessor]\ninclude_paths = [\"common\"]\n[macros]\nLIGHT = \"light.fsl\"\n",
    );
    write(
        temp.path(),
        "main.fsl",
        "#include LIGHT\n#include \"light.fsl\"\nvoid main() { return; }\n",
    );

    let output = filc(temp.path(), &["check", "main.fsl"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[test]
fn command_line_defines_extend_the_config() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "inc/shadow.fsl", "void shadow() { return; }\n");
    write(temp.path(), "main.fsl", "#include SHADOW\nvoid main() { return; }\n");

    let output = filc(
        temp.path(),
        &["check", "main.fsl", "-I", "inc", "-D", "SHADOW=shadow.fsl"],
    );
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[test]
fn unknown_characters_fail_tokenizing() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.fsl", "void main() { \u{e9} }\n");

    let output = filc(temp.path(), &["check", "main.fsl"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Error: Unexpected characters"));
}

#[test]
fn missing_include_fails_preprocessing() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.fsl", "#include \"nope.fsl\"\nvoid main() {}\n");

    let output = filc(temp.path(), &["check", "main.fsl"]);
    assert_eq!(output.status.code(), Some(3));
    let err = stderr(&output);
    assert!(err.starts_with("main.fsl 1:"));
    assert!(err.contains("Error: Could not read \"nope.fsl\": no such file"));
    assert!(err.contains("#include \"nope.fsl\""));
}

#[test]
fn undefined_macro_fails_preprocessing() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.fsl", "#include NOWHERE\nvoid main() {}\n");

    let output = filc(temp.path(), &["check", "main.fsl"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Macro has not been defined"));
}

#[test]
fn grammar_errors_fail_parsing() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.fsl", "void main( {}\n");

    let output = filc(temp.path(), &["check", "main.fsl"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("Error:"));
}

#[test]
fn warnings_go_to_stdout_and_do_not_fail() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.fsl", "#pragma once\nvoid main() {}\n");

    let output = filc(temp.path(), &["check", "main.fsl"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Warning: Unknown preprocessor directive \"pragma\""));
    assert!(stderr(&output).is_empty());
}

#[test]
fn fancy_diagnostics_render_the_message() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.fsl", "#include \"nope.fsl\"\n");

    let output = filc(temp.path(), &["--diagnostics", "fancy", "check", "main.fsl"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Could not read"));
}

#[test]
fn tokens_lists_one_token_per_line() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.fsl", "void main() {}\n");

    let output = filc(temp.path(), &["tokens", "main.fsl"]);
    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("main.fsl 1:1 "));
    assert!(lines[0].ends_with("\"void\""));
}

#[test]
fn tokens_expand_shows_included_files() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "lib.fsl", "float\n");
    write(temp.path(), "main.fsl", "#include \"lib.fsl\"\nvoid\n");

    let output = filc(temp.path(), &["tokens", "--expand", "main.fsl"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("lib.fsl 1:1 "));
    assert!(lines[1].starts_with("main.fsl 2:1 "));
}

#[test]
fn include_cycle_back_to_root_from_parent_directory() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "sub/main.fsl", "#include \"b.fsl\"\nvoid rootfn();\n");
    write(temp.path(), "sub/b.fsl", "#include \"main.fsl\"\nvoid bfn();\n");

    let output = filc(temp.path(), &["tokens", "--expand", "sub/main.fsl"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let out = stdout(&output);
    let roots: Vec<&str> = out.lines().filter(|line| line.contains("\"rootfn\"")).collect();
    assert_eq!(roots.len(), 1, "{out}");
    assert!(roots[0].starts_with("sub/main.fsl 2:"));
    assert_eq!(out.lines().filter(|line| line.contains("\"bfn\"")).count(), 1);
}

#[test]
fn aliased_includes_are_expanded_once() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "lib.fsl", "float\n");
    write(
        temp.path(),
        "main.fsl",
        "#include \"./lib.fsl\"\n#include \"lib.fsl\"\nvoid\n",
    );

    let output = filc(temp.path(), &["tokens", "--expand", "main.fsl"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(stdout(&output).lines().count(), 2);
}

#[test]
fn ast_prints_an_outline() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.fsl", "void main() { return; }\n");

    let output = filc(temp.path(), &["ast", "main.fsl"]);
    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("\"main\""));
    assert!(out.lines().any(|line| line.starts_with("  ")));
}

// ============================================================================
// Back end
// ============================================================================

#[test]
fn transpile_writes_a_spirv_module() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "shader.fil", encode(&fragment_binary()));

    let output = filc(temp.path(), &["transpile", "shader.fil", "-o", "out.spv"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let bytes = fs::read(temp.path().join("out.spv")).unwrap();
    assert_eq!(bytes.len() % 4, 0);
    assert_eq!(bytes[..4], SPIRV_MAGIC.to_le_bytes());
}

#[test]
fn transpile_defaults_to_spv_extension() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "shader.fil", encode(&fragment_binary()));

    let output = filc(temp.path(), &["transpile", "shader.fil"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(temp.path().join("shader.spv").exists());
}

#[test]
fn transpile_uses_the_configured_version() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "shader.fil", encode(&fragment_binary()));
    write(temp.path(), "fil.toml", "[spirv]\nversion = \"1.3\"\n");

    let output = filc(temp.path(), &["transpile", "shader.fil"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let bytes = fs::read(temp.path().join("shader.spv")).unwrap();
    assert_eq!(bytes[4..8], 0x0001_0300u32.to_le_bytes());
}

#[test]
fn transpile_errors_exit_with_stage_code() {
    let temp = TempDir::new().unwrap();
    let mut il = IlBinary::new();
    il.add_function("f", BuiltinType::Vec2.id(), Vec::new(), &call_body(&[]));
    write(temp.path(), "bad.fil", encode(&il));

    let output = filc(temp.path(), &["transpile", "bad.fil"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).starts_with("bad.fil 1:1 Error: "));
    assert!(!temp.path().join("bad.spv").exists());
}

#[test]
fn garbage_input_is_empty_when_lenient() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "junk.fil", b"not a fil binary");

    let output = filc(temp.path(), &["transpile", "junk.fil"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[test]
fn garbage_input_fails_when_strict() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "junk.fil", b"not a fil binary");

    let output = filc(temp.path(), &["transpile", "junk.fil", "--strict"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to decode"));
}

#[test]
fn strict_mode_from_config() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "junk.fil", b"not a fil binary");
    write(temp.path(), "fil.toml", "[il]\nstrict = true\n");

    let output = filc(temp.path(), &["il", "junk.fil"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn il_dumps_entrypoints_and_functions() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "shader.fil", encode(&fragment_binary()));

    let output = filc(temp.path(), &["il", "shader.fil"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.starts_with("entrypoint Fragment \"main\"\n"));
    assert!(out.contains("function 0 \"helper\" -> Void"));
}

// ============================================================================
// Failures outside the pipeline
// ============================================================================

#[test]
fn missing_input_exits_one() {
    let temp = TempDir::new().unwrap();
    let output = filc(temp.path(), &["check", "absent.fsl"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read"));
}

#[test]
fn broken_config_exits_one() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.fsl", "void main() {}\n");
    write(temp.path(), "fil.toml", "[preprocessor\n");

    let output = filc(temp.path(), &["check", "main.fsl"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to parse config"));
}
