use anyhow::Result;
use cdmo_reports::commands::{generate_report_command, query_command};
use cdmo_reports::config::load_from_current_dir;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cdmo-reports")]
#[command(about = "Generate structured CDMO reports from PDF documents and query them with RAG")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a report for a document and store its embeddings
    Report {
        /// File name of a PDF inside the documents directory
        file_name: String,
    },
    /// Query the indexed documents
    Query {
        /// Question to answer; words are joined with spaces
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_from_current_dir()?;

    match cli.command {
        Commands::Report { file_name } => {
            generate_report_command(config, &file_name).await?;
        }
        Commands::Query { text } => {
            query_command(config, &text).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn report_command() {
        let cli = Cli::try_parse_from(["cdmo-reports", "report", "doc1.pdf"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Report { file_name } = parsed.command {
                assert_eq!(file_name, "doc1.pdf");
            }
        }
    }

    #[test]
    fn report_requires_file_name() {
        let cli = Cli::try_parse_from(["cdmo-reports", "report"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        }
    }

    #[test]
    fn query_collects_words() {
        let cli = Cli::try_parse_from([
            "cdmo-reports",
            "query",
            "What",
            "is",
            "the",
            "boiling",
            "point?",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Query { text } = parsed.command {
                assert_eq!(text.join(" "), "What is the boiling point?");
            }
        }
    }

    #[test]
    fn query_requires_text() {
        let cli = Cli::try_parse_from(["cdmo-reports", "query"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["cdmo-reports", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["cdmo-reports", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
