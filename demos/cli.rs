use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;
use vereinonline_client_rs::{
    Client, Error, MailTemplate, MailTemplateCategory, MailTemplates, TemplateName,
};

#[derive(Parser, Debug)]
#[command(
    name = "vereinonline-client",
    about = "Inspect and edit VereinOnline mail templates (unofficial)",
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, env = "VEREINONLINE_BASE_URL", help = "Instance URL, e.g. https://www.vereinonline.org/IHRVEREIN/")]
    base_url: String,

    #[arg(short, long, env = "VEREINONLINE_USER")]
    user: String,

    #[arg(short, long, env = "VEREINONLINE_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long, help = "Proxy URL (optional)")]
    proxy: Option<String>,

    #[arg(long, help = "Check the credentials before running the command")]
    verify: bool,

    #[arg(value_enum)]
    category: Category,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Category {
    Members,
    Events,
    Votes,
    Conventions,
    Shop,
    Accounting,
    Reservations,
    Forum,
    Tasks,
    Files,
    Blog,
    DoubleOptIn,
    Layout,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the templates the server shows for this category
    Names,
    /// Print one template as JSON
    Get { name: String },
    /// Print every template of the category as JSON
    GetAll,
    /// Restore the server default of a template
    Reset { name: String },
    /// Overwrite a template and verify the result
    Set {
        name: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, help = "File containing the HTML body")]
        body_file: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut builder = Client::builder(&cli.base_url);
    if let Some(proxy) = &cli.proxy {
        builder = builder.proxy(proxy);
    }
    let mut client = builder.build()?;
    client.login(&cli.user, &cli.password, cli.verify).await?;

    let templates = client.mail_templates();
    dispatch(&templates, cli.category, cli.command).await?;
    Ok(())
}

async fn dispatch(
    templates: &MailTemplates<'_>,
    category: Category,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match category {
        Category::Members => run(templates.members(), command).await,
        Category::Events => run(templates.events(), command).await,
        Category::Votes => run(templates.votes(), command).await,
        Category::Conventions => run(templates.conventions(), command).await,
        Category::Shop => run(templates.shop(), command).await,
        Category::Accounting => run(templates.accounting(), command).await,
        Category::Reservations => run(templates.reservations(), command).await,
        Category::Forum => run(templates.forum(), command).await,
        Category::Tasks => run(templates.tasks(), command).await,
        Category::Files => run(templates.files(), command).await,
        Category::Blog => run(templates.blog(), command).await,
        Category::DoubleOptIn => run(templates.double_opt_in(), command).await,
        Category::Layout => run(templates.layout(), command).await,
    }
}

async fn run<T: TemplateName>(
    category: MailTemplateCategory<'_, T>,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Names => {
            let entries = category.fetch_all_template_names().await?;
            println!("{} template(s) listed:", entries.len());
            for entry in entries {
                let marker = if entry.is_active { "*" } else { " " };
                println!("{marker} {:>2}. {} ({})", entry.index, entry.name, entry.href);
            }
        }
        Commands::Get { name } => {
            let template = category.get(parse_name(&name)?).await?;
            print_json(&template)?;
        }
        Commands::GetAll => {
            let all: BTreeMap<&str, MailTemplate> = category
                .get_all()
                .await?
                .into_iter()
                .map(|(name, template)| (name.as_str(), template))
                .collect();
            print_json(&all)?;
        }
        Commands::Reset { name } => {
            let template = category.reset_to_default(parse_name(&name)?).await?;
            print_json(&template)?;
        }
        Commands::Set {
            name,
            subject,
            body_file,
        } => {
            let body = std::fs::read_to_string(&body_file)?;
            let data = MailTemplate {
                subject,
                html_body: Some(body),
                ..MailTemplate::default()
            };
            let saved = category.set(parse_name(&name)?, &data).await?;
            println!("Saved {}", saved.name);
        }
    }
    Ok(())
}

fn parse_name<T: TemplateName>(raw: &str) -> Result<T, Error> {
    T::ALL
        .iter()
        .copied()
        .find(|name| name.as_str().eq_ignore_ascii_case(raw))
        .ok_or_else(|| {
            let known: Vec<&str> = T::ALL.iter().map(|name| name.as_str()).collect();
            Error::InvalidInput(format!(
                "unknown {} template {raw:?}, expected one of: {}",
                T::CATEGORY.name,
                known.join(", ")
            ))
        })
}

fn print_json<S: serde::Serialize>(value: &S) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
