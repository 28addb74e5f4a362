// Copyright (C) 2026 by GiGa infosystems

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use color_eyre::{
    Result,
    eyre::{Report as EyreReport, bail},
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use lockdiff::config::Config;
use lockdiff::diff::diff;
use lockdiff::git::Repository;
use lockdiff::lock::{self, DEFAULT_LOCK_FILE, Locator};
use lockdiff::report::{Report, SectionKind};
use lockdiff::url::UrlGenerators;

/// The output formats, see [`TemplateContext`] for the templated ones
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum Format {
    /// A Markdown table per section
    Mdtable,
    /// A Markdown list per section
    Mdlist,
    /// The report as JSON
    Json,
}

impl Format {
    fn template_name(self) -> Option<&'static str> {
        match self {
            Format::Mdtable => Some("mdtable.jinja"),
            Format::Mdlist => Some("mdlist.jinja"),
            Format::Json => None,
        }
    }
}

struct TemplateContext {
    /// The directory user templates are loaded from, if any
    path: Option<PathBuf>,
    jinja: minijinja::Environment<'static>,
}

impl TemplateContext {
    /// The template in `--template-path` that replaces the built-in formats
    const CUSTOM: &'static str = "report.jinja";

    fn init(path: Option<PathBuf>) -> Result<Self> {
        let mut jinja = minijinja::Environment::new();
        jinja.add_template("mdtable.jinja", include_str!("../templates/mdtable.jinja"))?;
        jinja.add_template("mdlist.jinja", include_str!("../templates/mdlist.jinja"))?;

        if let Some(ref path) = path {
            if !path.is_dir() {
                bail!("Template directory doesn't exist");
            }
            jinja.set_loader(minijinja::path_loader(path));
        }

        Ok(TemplateContext { path, jinja })
    }

    fn has_custom(&self) -> bool {
        self.path
            .as_ref()
            .is_some_and(|path| path.join(Self::CUSTOM).is_file())
    }

    fn render(&self, format: Format, ctx: &impl Serialize) -> Result<String> {
        let name = if self.has_custom() {
            Self::CUSTOM
        } else {
            match format.template_name() {
                Some(name) => name,
                None => return Ok(serde_json::to_string_pretty(ctx)?),
            }
        };

        let out = self.jinja.get_template(name)?.render(ctx)?;
        Ok(out.trim().to_owned())
    }
}

/// Lists the changes between two `composer.lock` files, which may also be read from `git`
/// revisions.
///
/// Locators are either paths to lock files, `<rev>:<path>` for a lock file at a `git` revision,
/// or just `<rev>` to read `composer.lock` at that revision.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The lock file to compare against
    #[arg(short, long, default_value = "HEAD:composer.lock")]
    base: String,
    /// The updated lock file
    #[arg(short, long, default_value = DEFAULT_LOCK_FILE)]
    target: String,
    /// Ignore development dependencies
    #[arg(long)]
    no_dev: bool,
    /// Include platform requirements (such as `php` & extensions)
    #[arg(short = 'p', long)]
    with_platform: bool,
    /// Include links to releases & comparisons
    #[arg(short = 'l', long)]
    with_links: bool,
    /// The output format
    #[arg(short, long, value_enum, default_value_t = Format::Mdtable)]
    format: Format,
    /// The path to a directory containing a `report.jinja` minijinja template
    ///
    /// The template receives the same context as the JSON output (`sections` and `with_links`)
    /// and replaces the format given with `--format`.
    #[arg(short = 'T', long)]
    template_path: Option<PathBuf>,
    /// Hosts of self-hosted GitLab instances to generate links for
    #[arg(long = "gitlab-domain", value_name = "HOST")]
    gitlab_domains: Vec<String>,
    /// The configuration file, defaults to `lockdiff.toml` if it exists
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Exit with status 2 if production packages changed, 4 if development packages changed, or
    /// both added together
    #[arg(long)]
    strict: bool,
    /// Log debugging information to stderr (overridden by `RUST_LOG`)
    #[arg(short, long)]
    verbose: bool,
}

struct AppContext {
    base: Locator,
    target: Locator,
    include_dev: bool,
    include_platform: bool,
    with_links: bool,
    format: Format,
    strict: bool,
    config: Config,
    repository: Repository,
    template_ctx: TemplateContext,
}

impl TryFrom<Args> for AppContext {
    type Error = EyreReport;

    fn try_from(args: Args) -> Result<Self> {
        let config = Config::load_or_default(args.config.as_deref())?
            .with_gitlab_domains(args.gitlab_domains);

        Ok(AppContext {
            base: Locator::parse(&args.base, DEFAULT_LOCK_FILE),
            target: Locator::parse(&args.target, DEFAULT_LOCK_FILE),
            include_dev: !args.no_dev,
            include_platform: args.with_platform,
            with_links: args.with_links,
            format: args.format,
            strict: args.strict,
            config,
            repository: Repository::new(None),
            template_ctx: TemplateContext::init(args.template_path)?,
        })
    }
}

impl AppContext {
    fn run(&self) -> Result<ExitCode> {
        let rule = &self.config.dev_versions;
        let old = lock::load(&self.base, &self.repository, rule)?;
        let new = lock::load(&self.target, &self.repository, rule)?;

        let operations = diff(&old, &new, self.include_dev, self.include_platform)?;

        let generators = self
            .with_links
            .then(|| UrlGenerators::from_config(&self.config));
        let report = Report::new(&operations, generators.as_ref(), rule);

        let out = self.template_ctx.render(self.format, &report)?;
        if !out.is_empty() {
            println!("{out}");
        }

        Ok(self.exit_code(&report))
    }

    fn exit_code(&self, report: &Report) -> ExitCode {
        if !self.strict {
            return ExitCode::SUCCESS;
        }

        let mut code = 0;
        if report.has_changes(SectionKind::Production) {
            code |= 2;
        }
        if report.has_changes(SectionKind::Development) {
            code |= 4;
        }
        ExitCode::from(code)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "lockdiff=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.verbose);

    let ctx = AppContext::try_from(args)?;
    ctx.run()
}
