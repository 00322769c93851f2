use std::fs;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use nestree::application::DocumentFormat;
use nestree::cli::{execute_command, Cli, Commands, ConfigCommands};
use nestree::config::Settings;
use nestree::exitcode;
use nestree::infrastructure::ServiceContainer;
use nestree::util::testing::init_test_setup;
use rstest::rstest;
use tempfile::TempDir;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("nestree").chain(args.iter().copied()))
        .expect("valid command line")
}

#[test]
fn given_cli_definition_when_checked_then_consistent() {
    init_test_setup();
    Cli::command().debug_assert();
}

#[test]
fn given_repeated_debug_flag_when_parsing_then_counted() {
    let cli = parse(&["-ddd", "show", "tree.json"]);
    assert_eq!(cli.debug, 3);
}

#[test]
fn given_global_format_after_subcommand_when_parsing_then_applied() {
    let cli = parse(&["convert", "tree.json", "--format", "toml", "-o", "out.toml"]);

    assert_eq!(cli.format, Some(DocumentFormat::Toml));
    match cli.command {
        Some(Commands::Convert { file, output }) => {
            assert_eq!(file, PathBuf::from("tree.json"));
            assert_eq!(output, Some(PathBuf::from("out.toml")));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn given_query_command_when_parsing_then_id_and_flag_read() {
    let cli = parse(&["ancestors", "tree.json", "4", "--include-self"]);

    match cli.command {
        Some(Commands::Ancestors {
            id, include_self, ..
        }) => {
            assert_eq!(id, 4);
            assert!(include_self);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[rstest]
#[case(&["ancestors", "tree.json", "not-a-number"])]
#[case(&["convert"])]
#[case(&["show", "tree.json", "--format", "yaml"])]
fn given_bad_arguments_when_parsing_then_rejected(#[case] args: &[&str]) {
    let result = Cli::try_parse_from(std::iter::once("nestree").chain(args.iter().copied()));
    assert!(result.is_err());
}

#[test]
fn given_config_subcommand_when_parsing_then_nested_command() {
    let cli = parse(&["config", "template"]);
    assert!(matches!(
        cli.command,
        Some(Commands::Config {
            command: ConfigCommands::Template
        })
    ));
}

fn container() -> ServiceContainer {
    ServiceContainer::new(Settings::default())
}

fn tree_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn given_adjacency_file_when_converting_to_output_then_file_written() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let input = tree_file(
        &dir,
        "tree.json",
        r#"{"kind":"adjacency_list","nodes":[{"id":1,"parent_id":0},{"id":2,"parent_id":1}]}"#,
    );
    let output = dir.path().join("tree.toml");
    let output_arg = output.to_string_lossy().into_owned();
    let cli = parse(&["convert", &input, "-o", &output_arg]);

    execute_command(&cli, &container()).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("kind = \"nested_set\""));
}

#[test]
fn given_adjacency_file_when_tightening_then_data_error() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let input = tree_file(
        &dir,
        "tree.json",
        r#"{"kind":"adjacency_list","nodes":[{"id":1,"parent_id":0}]}"#,
    );
    let cli = parse(&["tighten", &input]);

    let err = execute_command(&cli, &container()).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_missing_file_when_validating_then_no_input() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.json").to_string_lossy().into_owned();
    let cli = parse(&["validate", &missing]);

    let err = execute_command(&cli, &container()).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_overlapping_intervals_when_validating_then_data_error() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let input = tree_file(
        &dir,
        "tree.json",
        r#"{"kind":"nested_set","nodes":[{"id":1,"left":1,"right":5},{"id":2,"left":3,"right":8}]}"#,
    );
    let cli = parse(&["validate", &input]);

    let err = execute_command(&cli, &container()).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert!(err.to_string().contains("overlap"));
}

#[test]
fn given_no_subcommand_when_executing_then_usage_error() {
    init_test_setup();
    let cli = parse(&[]);

    let err = execute_command(&cli, &container()).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}
