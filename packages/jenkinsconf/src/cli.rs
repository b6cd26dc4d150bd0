//! Command-line interface for inspecting configurations.

use std::fmt::Write as _;
use std::path::Path;

use clap::{Parser, Subcommand};
use console::style;

use crate::error::{ConfError, Result};
use crate::http::HttpOptions;
use crate::registry::{Owner, Plugin, Resolver};
use crate::server::Server;
use crate::xml::{split_declaration, XmlElement};

/// jenkinsconf - Inspect Jenkins job and view configurations as plugin trees.
#[derive(Parser)]
#[command(name = "jenkinsconf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every supported plugin type.
    Plugins,

    /// Print the plugin tree of a local config.xml file.
    Inspect {
        /// Path to the configuration file
        file: std::path::PathBuf,
    },

    /// Fetch a job or view configuration from a server and print its tree.
    Show {
        /// Server URL (e.g., https://ci.example.com/)
        #[arg(long)]
        server: String,

        /// Job name; use `folder/job` for jobs inside folders
        #[arg(long, conflicts_with = "view", required_unless_present = "view")]
        job: Option<String>,

        /// View name
        #[arg(long)]
        view: Option<String>,

        /// User name for basic authentication
        #[arg(long, requires = "token")]
        user: Option<String>,

        /// API token for basic authentication
        #[arg(long, requires = "user")]
        token: Option<String>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plugins => plugins_command(),
        Commands::Inspect { file } => inspect_command(&file),
        Commands::Show {
            server,
            job,
            view,
            user,
            token,
        } => show_command(
            &server,
            job.as_deref(),
            view.as_deref(),
            user.zip(token),
        ),
    }
}

fn plugins_command() -> Result<()> {
    let resolver = Resolver::shared();
    for descriptor in resolver.registry().all_handlers() {
        let kind = format!("{:<15}", descriptor.kind().as_str());
        let mut line = format!("{} {}", style(kind).cyan(), descriptor.type_id());
        if !descriptor.aliases().is_empty() {
            let _ = write!(line, " {}", style(format!("({})", descriptor.aliases().join(", "))).dim());
        }
        println!("{line}");
    }
    Ok(())
}

fn inspect_command(file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)?;
    let (_, body) = split_declaration(&text);
    let root = XmlElement::parse(body).map_err(|e| ConfError::MalformedDocument {
        context: file.display().to_string(),
        reason: e.to_string(),
    })?;
    let plugin = Resolver::shared().classify(root, Owner::Detached);
    print!("{}", render_tree(plugin)?);
    Ok(())
}

fn show_command(
    url: &str,
    job: Option<&str>,
    view: Option<&str>,
    credentials: Option<(String, String)>,
) -> Result<()> {
    let mut options = HttpOptions::default();
    if let Some((user, token)) = credentials {
        options = options.with_credentials(user, token);
    }
    let server = Server::connect(url, options)?;

    let root = match (job, view) {
        (Some(path), _) => {
            let mut names = path.split('/').filter(|n| !n.is_empty());
            let first = names
                .next()
                .ok_or_else(|| ConfError::InvalidName(path.to_string()))?;
            let mut job = server.job(first)?;
            for name in names {
                job = job.job(name)?;
            }
            println!("{} {}", style("Job").bold(), style(job.url()).cyan());
            job.config().root_node()?
        }
        (None, Some(name)) => {
            let view = server.view(name)?;
            println!("{} {}", style("View").bold(), style(view.url()).cyan());
            view.config().root_node()?
        }
        (None, None) => return Err(ConfError::InvalidName(String::new())),
    };

    let plugin = server.resolver().classify_node(root);
    print!("{}", render_tree(plugin)?);
    Ok(())
}

/// Render a plugin and everything below it, one indented line per plugin.
pub fn render_tree(root: Plugin) -> Result<String> {
    let mut out = String::new();
    let mut pending = vec![(root, 0usize)];
    while let Some((plugin, depth)) = pending.pop() {
        let _ = writeln!(out, "{}{}", "  ".repeat(depth), describe(&plugin));
        let mut children = plugin.children()?;
        children.reverse();
        pending.extend(children.into_iter().map(|child| (child, depth + 1)));
    }
    Ok(out)
}

fn describe(plugin: &Plugin) -> String {
    let mut line = match plugin.kind() {
        Some(kind) => format!("{} {}", style(kind).cyan(), plugin.type_id()),
        None => format!("{} {}", style("unrecognized").yellow(), plugin.type_id()),
    };
    let name = plugin.node().child_text("name");
    if !name.is_empty() {
        let _ = write!(line, " {}", style(format!("\"{name}\"")).green());
    }
    if let Some(provenance) = plugin.provenance() {
        let _ = write!(line, " {}", style(format!("[{provenance}]")).dim());
    }
    line
}
