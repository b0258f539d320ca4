//! adminpanel: command-line front end for the gestoría admin API.
//!
//! Usage:
//!   adminpanel whoami
//!   adminpanel clientes [--search TEXT] [--page N] [--limit N]
//!   adminpanel procesos --cliente ID --mes M --anio Y
//!   adminpanel hitos --proceso ID [--proceso ID ...] [filters]
//!   adminpanel descargar --id ID [--salida PATH]
//!   adminpanel subir --documento ID --cliente ID --archivo PATH
//!   adminpanel eliminar --tipo KIND --id ID [--yes]
//!
//! Configuration is read from `~/.adminpanel/config.json`; `ADMINPANEL_TOKEN`
//! overrides the stored token.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use adminpanel_lib::api::documental::Upload;
use adminpanel_lib::api::ApiClient;
use adminpanel_lib::auth::Session;
use adminpanel_lib::error::ApiError;
use adminpanel_lib::hitos::{DateFilter, DueCategory, FulfillmentFilter, Reference, SortKey};
use adminpanel_lib::services::calendar::{load_hitos, CalendarAction, CalendarState};
use adminpanel_lib::services::confirm::{Confirmation, ResourceKind};
use adminpanel_lib::services::listing::ViewResult;
use adminpanel_lib::state::load_config;
use adminpanel_lib::types::{Config, ListParams, SortDirection};

#[derive(Parser)]
#[command(name = "adminpanel", version, about = "Clientes, documentos e hitos desde la terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the user in the configured token
    Whoami,
    /// List clients
    Clientes {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size (defaults to the configured page size)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List the processes assigned to a client for a month
    Procesos {
        #[arg(long)]
        cliente: u32,
        #[arg(long)]
        mes: u32,
        #[arg(long)]
        anio: i32,
    },
    /// Milestone calendar across one or more client processes
    Hitos {
        /// Client process id (repeatable)
        #[arg(long = "proceso", required = true)]
        procesos: Vec<u32>,
        /// Date category, e.g. vencido, hoy, manana, urgente (repeatable)
        #[arg(long = "categoria")]
        categorias: Vec<DateFilter>,
        /// all, con or sin
        #[arg(long, default_value = "all")]
        cumplimiento: FulfillmentFilter,
        #[arg(long)]
        buscar: Option<String>,
        #[arg(long)]
        desde: Option<NaiveDate>,
        #[arg(long)]
        hasta: Option<NaiveDate>,
        #[arg(long, default_value = "fecha_limite")]
        orden: SortKey,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        pagina: u32,
        /// Print the page as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Download a stored client file
    Descargar {
        #[arg(long)]
        id: u32,
        /// Destination path (defaults to the server-provided filename)
        #[arg(long)]
        salida: Option<PathBuf>,
    },
    /// Upload a file for a client against a document type
    Subir {
        #[arg(long)]
        documento: u32,
        #[arg(long)]
        cliente: u32,
        #[arg(long)]
        archivo: PathBuf,
    },
    /// Delete a record after confirmation
    Eliminar {
        #[arg(long, value_enum)]
        tipo: Recurso,
        #[arg(long)]
        id: u32,
        /// Skip the interactive prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Recurso {
    Cliente,
    Documento,
    Archivo,
    Metadato,
    Persona,
}

impl From<Recurso> for ResourceKind {
    fn from(r: Recurso) -> Self {
        match r {
            Recurso::Cliente => ResourceKind::Cliente,
            Recurso::Documento => ResourceKind::Documento,
            Recurso::Archivo => ResourceKind::Archivo,
            Recurso::Metadato => ResourceKind::Metadato,
            Recurso::Persona => ResourceKind::Persona,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        match e.downcast_ref::<ApiError>() {
            Some(api) => {
                log::debug!("{:?}", api);
                eprintln!("{}", api.user_message());
            }
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    let config =
        load_config().map_err(|e| anyhow::anyhow!("Failed to load adminpanel config: {e}"))?;

    match command {
        Commands::Whoami => whoami(&config),
        Commands::Clientes {
            search,
            page,
            limit,
        } => {
            let client = ApiClient::new(&config)?;
            let mut params = ListParams::page(page, limit.unwrap_or(config.page_size));
            if let Some(search) = search {
                params = params.with_search(search);
            }
            match ViewResult::from_page(client.list_clientes(&params).await, "No hay clientes") {
                ViewResult::Success { data, total } => {
                    for c in &data {
                        println!(
                            "{:>6}  {:<12} {}",
                            c.id.map(|id| id.to_string()).unwrap_or_default(),
                            c.cif,
                            c.razon_social
                        );
                    }
                    println!("{} de {} clientes", data.len(), total);
                }
                ViewResult::Empty { message } => println!("{}", message),
                ViewResult::Error { error } => anyhow::bail!(error.message),
            }
            Ok(())
        }
        Commands::Procesos { cliente, mes, anio } => {
            let client = ApiClient::new(&config)?;
            let procesos = client.list_cliente_procesos(cliente, mes, anio).await?;
            if procesos.is_empty() {
                println!("Sin procesos para {:02}/{}", mes, anio);
            }
            for p in procesos {
                println!(
                    "{:>6}  {}",
                    p.id,
                    p.nombre.as_deref().unwrap_or("(sin nombre)")
                );
            }
            Ok(())
        }
        Commands::Hitos {
            procesos,
            categorias,
            cumplimiento,
            buscar,
            desde,
            hasta,
            orden,
            desc,
            pagina,
            json,
        } => {
            let client = Arc::new(ApiClient::new(&config)?);
            let hitos = load_hitos(client, &procesos).await;

            let mut state = CalendarState::new(config.page_size, config.urgent_window_hours);
            state.apply(CalendarAction::Loaded(hitos));
            for categoria in categorias.into_iter().collect::<BTreeSet<_>>() {
                state.apply(CalendarAction::ToggleDateFilter(categoria));
            }
            state.apply(CalendarAction::SetFulfillment(cumplimiento));
            if let Some(text) = buscar {
                state.apply(CalendarAction::SetText(text));
            }
            state.apply(CalendarAction::SetRange {
                from: desde,
                to: hasta,
            });
            let direction = if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            state.apply(CalendarAction::SetSort(orden, direction));
            state.apply(CalendarAction::GoToPage(pagina));

            let at = Reference::now(config.tz());
            let view = state.view(&at);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            for row in &view.rows {
                let mut flags = Vec::new();
                if row.urgent {
                    flags.push("URGENTE");
                }
                if row.due_tomorrow {
                    flags.push("mañana");
                }
                if row.finished_late {
                    flags.push("fuera de plazo");
                }
                println!(
                    "{:>6}  {:<10} {:<5} {:<12} {:<30} {}",
                    row.hito.id,
                    row.hito.fecha_limite.as_deref().unwrap_or("-"),
                    row.hito.hora_limite.as_deref().unwrap_or(""),
                    row.category.label(),
                    row.nombre,
                    flags.join(", ")
                );
            }
            println!(
                "Página {}/{} · {} hitos",
                view.page, view.total_pages, view.total
            );
            let summary: Vec<String> = DueCategory::ALL
                .iter()
                .map(|c| format!("{}: {}", c.label(), view.counts.get(c).copied().unwrap_or(0)))
                .collect();
            println!("{} · urgentes: {}", summary.join(" · "), view.urgent_count);
            Ok(())
        }
        Commands::Descargar { id, salida } => {
            let client = ApiClient::new(&config)?;
            let blob = client.download_archivo(id).await?;
            let path = salida
                .or_else(|| blob.filename.as_ref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(format!("archivo-{}", id)));
            tokio::fs::write(&path, &blob.bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} ({} bytes)", path.display(), blob.bytes.len());
            Ok(())
        }
        Commands::Subir {
            documento,
            cliente,
            archivo,
        } => {
            let client = ApiClient::new(&config)?;
            let upload = Upload::from_path(documento, cliente, &archivo).await?;
            let stored = client.upload_archivo(upload).await?;
            println!("Subido {} (id {})", stored.nombre_archivo, stored.id);
            Ok(())
        }
        Commands::Eliminar { tipo, id, yes } => {
            let client = ApiClient::new(&config)?;
            let kind = ResourceKind::from(tipo);
            let name = display_name(&client, kind, id).await?;
            let confirmation = Confirmation::delete(kind, id, name);
            if !yes && !ask(&confirmation.prompt())? {
                confirmation.decline();
                println!("Cancelado");
                return Ok(());
            }
            let confirmed = confirmation.confirm();
            match kind {
                ResourceKind::Cliente => client.delete_cliente(confirmed).await?,
                ResourceKind::Documento => client.delete_documento(confirmed).await?,
                ResourceKind::Archivo => client.delete_archivo(confirmed).await?,
                ResourceKind::Metadato => client.delete_metadato(confirmed).await?,
                ResourceKind::Persona => client.delete_persona(confirmed).await?,
                ResourceKind::Departamento | ResourceKind::Categoria => {
                    anyhow::bail!("Unsupported resource for the CLI")
                }
            }
            println!("Eliminado");
            Ok(())
        }
    }
}

fn whoami(config: &Config) -> Result<()> {
    let token = config
        .token
        .as_deref()
        .context("No token configured. Set ADMINPANEL_TOKEN or add \"token\" to config.json")?;
    let session = Session::from_token(token);
    match session.current_user() {
        Some(user) => {
            println!("{}", user.display_name());
            if let Some(dep) = &user.departamento {
                println!("Departamento: {}", dep);
            }
            if session.is_expired(chrono::Utc::now()) {
                println!("El token ha caducado");
            }
        }
        None => println!("Token sin datos de usuario legibles"),
    }
    Ok(())
}

/// Name shown in the delete prompt. Files have no detail endpoint; an empty name
/// makes the prompt fall back to the id.
async fn display_name(client: &ApiClient, kind: ResourceKind, id: u32) -> Result<String> {
    let name = match kind {
        ResourceKind::Cliente => client.get_cliente(id).await?.razon_social,
        ResourceKind::Documento => client.get_documento(id).await?.nombre,
        ResourceKind::Metadato => client.get_metadato(id).await?.nombre,
        ResourceKind::Persona => client.get_persona(id).await?.full_name(),
        _ => String::new(),
    };
    Ok(name)
}

fn ask(prompt: &str) -> Result<bool> {
    print!("{} [s/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "si" | "sí" | "y" | "yes"))
}
