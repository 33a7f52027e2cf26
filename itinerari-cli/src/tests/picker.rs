//! Prompt-based path selection.

use super::*;
use crate::compare::CompareArgs;
use crate::picker::{PathPicker, PromptPicker};
use camino::{Utf8Path, Utf8PathBuf};
use rstest::rstest;
use std::io::Cursor;

#[rstest]
fn prompts_show_the_initial_directory() {
    let mut output = Vec::new();
    let mut picker = PromptPicker::new(Cursor::new("out\n  ITINERARI.xml \n"), &mut output);

    let dir = picker
        .pick_output_dir(Utf8Path::new("/srv"))
        .expect("prompt output dir");
    let xml = picker
        .pick_xml_file(Utf8Path::new("/srv"))
        .expect("prompt xml");

    assert_eq!(dir, Some(Utf8PathBuf::from("out")));
    assert_eq!(xml, Some(Utf8PathBuf::from("ITINERARI.xml")));
    let shown = String::from_utf8(output).expect("utf-8 prompt");
    assert_eq!(
        shown,
        "Inserisci percorso directory di output (default: /srv): \
         Inserisci percorso file XML (default: /srv): "
    );
}

#[rstest]
#[case("\n")]
#[case("")]
fn blank_answer_cancels(#[case] input: &str) {
    let mut picker = PromptPicker::new(Cursor::new(input), Vec::<u8>::new());
    let answer = picker
        .pick_xml_file(Utf8Path::new("."))
        .expect("prompt xml");
    assert_eq!(answer, None);
}

#[rstest]
fn fill_asks_only_for_missing_paths() {
    let args = CompareArgs {
        output_dir: Some(Utf8PathBuf::from("configured")),
        ..CompareArgs::default()
    };
    let mut output = Vec::new();
    let mut picker = PromptPicker::new(Cursor::new("picked.xml\n"), &mut output);

    let filled = args
        .fill_with(&mut picker, Utf8Path::new("."))
        .expect("fill should succeed");

    assert_eq!(filled.output_dir, Some(Utf8PathBuf::from("configured")));
    assert_eq!(filled.xml, Some(Utf8PathBuf::from("picked.xml")));
    let shown = String::from_utf8(output).expect("utf-8 prompt");
    assert!(!shown.contains("directory di output"));
}

#[rstest]
fn fill_reports_cancelled_output_dir() {
    let mut picker = PromptPicker::new(Cursor::new("\n"), Vec::<u8>::new());
    let err = CompareArgs::default()
        .fill_with(&mut picker, Utf8Path::new("."))
        .expect_err("cancelled selection should error");
    match err {
        CliError::SelectionCancelled { field } => assert_eq!(field, ARG_OUTPUT_DIR),
        other => panic!("expected SelectionCancelled, found {other:?}"),
    }
}
