use std::path::PathBuf;

use clap::Parser;
use jbi::cli::{Cli, Commands};

#[test]
fn test_parse_validate() {
    let cli = Cli::try_parse_from(vec!["jbi", "validate", "--actions", "config/config.prod.yaml"])
        .unwrap();

    match cli.command {
        Commands::Validate(args) => {
            assert_eq!(args.actions, Some(PathBuf::from("config/config.prod.yaml")));
        }
        _ => panic!("Wrong top-level command"),
    }
    assert!(!cli.json);
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(vec!["jbi", "steps", "--json", "--config", "jbi.yaml"]).unwrap();

    assert!(matches!(cli.command, Commands::Steps(_)));
    assert!(cli.json);
    assert_eq!(cli.config, Some(PathBuf::from("jbi.yaml")));
}

#[test]
fn test_parse_classify_requires_payload() {
    assert!(Cli::try_parse_from(vec!["jbi", "classify"]).is_err());

    let cli = Cli::try_parse_from(vec!["jbi", "classify", "--payload", "event.json"]).unwrap();
    match cli.command {
        Commands::Classify(args) => {
            assert_eq!(args.payload, PathBuf::from("event.json"));
            assert!(args.actions.is_none());
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_unknown_command_fails() {
    assert!(Cli::try_parse_from(vec!["jbi", "serve"]).is_err());
}
