use clap::Parser;
use revsift::cli::{Cli, Commands, ExtractArgs, ExtractFormat};

#[test]
fn extract_flag_parsing() {
    // Given
    let argv = vec![
        "rsift",
        "extract",
        "page.html",
        "--format",
        "json",
        "--url",
        "https://example.test/pr/1",
    ];

    // When
    let cmd = Cli::parse_from(argv);

    // Then
    match cmd.command {
        Commands::Extract(ExtractArgs { page, url, format }) => {
            assert_eq!(format, ExtractFormat::Json);
            assert_eq!(url.as_deref(), Some("https://example.test/pr/1"));
            assert!(page.to_string_lossy().ends_with("page.html"));
        }
        _ => panic!("expected Extract command"),
    }
}

#[test]
fn prompt_ids_split_on_commas() {
    let cmd = Cli::parse_from(["rsift", "prompt", "page.html", "--ids", "a,b,c"]);

    match cmd.command {
        Commands::Prompt(args) => {
            assert_eq!(args.ids, vec!["a", "b", "c"]);
            assert!(!args.all);
            assert!(args.output.is_none());
        }
        _ => panic!("expected Prompt command"),
    }
}

#[test]
fn deselect_requires_at_least_one_id() {
    let parsed = Cli::try_parse_from(["rsift", "deselect", "page.html"]);

    assert!(parsed.is_err(), "ids should be mandatory for deselect");
}

#[test]
fn global_flags_are_recognized() {
    let cmd = Cli::parse_from(["rsift", "extract", "page.html", "--quiet", "--no-color"]);

    assert!(cmd.quiet);
    assert!(cmd.no_color);
    assert!(!cmd.dry_run);
}

#[test]
fn watch_settle_override_parsing() {
    let cmd = Cli::parse_from(["rsift", "watch", "page.html", "--settle-ms", "500"]);

    match cmd.command {
        Commands::Watch(args) => assert_eq!(args.settle_ms, Some(500)),
        _ => panic!("expected Watch command"),
    }
}
