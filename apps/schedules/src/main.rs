use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    CarrierSearch, PortSearch, ScheduleApiClient, SuggestionQuery, SuggestionSearch,
};
use form_controls::{
    dates::{format_display, parse_api, parse_display},
    typeahead::highlight,
    Phase, Preset, ScheduleForm, SystemClock, TypeaheadConfig, TypeaheadController,
};
use shared::protocol::{
    ExportFormat, PageRequest, RoutingType, ScheduleFilter, SchedulePage, SortKey,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "schedules", about = "Search and export shipping schedules")]
struct Cli {
    /// Backend base URL; overrides settings and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Ignore filters saved by the previous run.
    #[arg(long, global = true)]
    no_restore: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List one page of matching schedules.
    List {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 50)]
        page_size: u32,
    },
    /// Download every matching schedule as CSV or XLSX.
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_parser = parse_export_format)]
        format: ExportFormat,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Suggest ports for a name or code fragment.
    Ports {
        query: String,
        #[arg(long)]
        country: Option<String>,
    },
    /// Suggest carriers for a name or SCAC fragment.
    Carriers { query: String },
    /// Check that the backend is reachable.
    Health,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Origin LOCODE or port name.
    #[arg(long)]
    origin: Option<String>,
    /// Destination LOCODE or port name.
    #[arg(long)]
    destination: Option<String>,
    /// Carrier SCAC or name.
    #[arg(long)]
    carrier: Option<String>,
    /// First departure day, dd/mm/yyyy.
    #[arg(long, conflicts_with = "preset")]
    from: Option<String>,
    /// Last departure day, dd/mm/yyyy.
    #[arg(long, conflicts_with = "preset")]
    to: Option<String>,
    #[arg(long, value_parser = parse_preset)]
    preset: Option<Preset>,
    #[arg(long)]
    equipment: Option<String>,
    #[arg(long, value_parser = parse_routing_type)]
    routing_type: Option<RoutingType>,
    #[arg(long, value_parser = parse_sort)]
    sort: Option<SortKey>,
}

fn parse_export_format(raw: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(raw).ok_or_else(|| format!("unknown export format '{raw}' (csv, xlsx)"))
}

fn parse_preset(raw: &str) -> Result<Preset, String> {
    Preset::from_name(raw).ok_or_else(|| {
        let names: Vec<_> = Preset::ALL.iter().map(|p| p.name()).collect();
        format!("unknown preset '{raw}' ({})", names.join(", "))
    })
}

fn parse_routing_type(raw: &str) -> Result<RoutingType, String> {
    RoutingType::parse(raw)
        .ok_or_else(|| format!("unknown routing type '{raw}' (direct, transshipment)"))
}

fn parse_sort(raw: &str) -> Result<SortKey, String> {
    SortKey::parse(raw).ok_or_else(|| format!("unknown sort key '{raw}' (etd, transit)"))
}

struct App {
    client: ScheduleApiClient,
    settings: config::Settings,
    state_path: Option<PathBuf>,
    restore: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let settings = config::load_settings();
    let api_url = settings.api_url(cli.api_url.as_deref())?;
    let client = ScheduleApiClient::new(&api_url)?;
    let state_path = settings
        .state_path
        .clone()
        .or_else(state::default_state_path);
    let app = App {
        client,
        settings,
        state_path,
        restore: !cli.no_restore,
    };

    match cli.command {
        Command::List {
            filters,
            page,
            page_size,
        } => app.list(filters, PageRequest { page, page_size }).await,
        Command::Export {
            filters,
            format,
            output,
        } => app.export(filters, format, output).await,
        Command::Ports { query, country } => app.ports(&query, country).await,
        Command::Carriers { query } => app.carriers(&query).await,
        Command::Health => app.health().await,
    }
}

impl App {
    fn form(&self) -> ScheduleForm {
        let port_config = self.settings.typeahead(TypeaheadConfig::for_ports());
        ScheduleForm::new(
            Arc::new(PortSearch::new(self.client.clone())),
            Arc::new(CarrierSearch::new(self.client.clone())),
            Arc::new(SystemClock),
            port_config,
        )
    }

    /// Saved filters first, then every flag given on the command line.
    async fn fill_form(&self, args: FilterArgs) -> Result<ScheduleForm> {
        let mut form = self.form();
        if self.restore {
            if let Some(saved) = self
                .state_path
                .as_deref()
                .and_then(state::load_last_filters)
            {
                info!("restoring previous filters");
                form.restore(&saved);
            }
        }

        if let Some(text) = args.origin.as_deref() {
            resolve_code("origin", &mut form.origin, text).await?;
        }
        if let Some(text) = args.destination.as_deref() {
            resolve_code("destination", &mut form.destination, text).await?;
        }
        if let Some(text) = args.carrier.as_deref() {
            resolve_code("carrier", &mut form.carrier, text).await?;
        }

        if let Some(preset) = args.preset {
            form.dates.select_preset(preset);
        }
        if let Some(text) = args.from.as_deref() {
            check_display_date("--from", text)?;
            form.dates.set_from_text(text);
        }
        if let Some(text) = args.to.as_deref() {
            check_display_date("--to", text)?;
            form.dates.set_to_text(text);
        }

        if let Some(equipment) = args.equipment {
            form.equipment = Some(equipment);
        }
        if let Some(routing_type) = args.routing_type {
            form.routing_type = Some(routing_type);
        }
        if let Some(sort) = args.sort {
            form.sort = sort;
        }
        Ok(form)
    }

    fn remember(&self, filter: &ScheduleFilter) {
        let Some(path) = self.state_path.as_deref() else {
            return;
        };
        if let Err(err) = state::save_last_filters(path, filter) {
            warn!(error = %err, "could not save filters");
        }
    }

    async fn list(&self, args: FilterArgs, page: PageRequest) -> Result<()> {
        let form = self.fill_form(args).await?;
        let filter = form.build_filter()?;
        info!(page = page.page, page_size = page.page_size, "listing schedules");
        let result = self.client.list_schedules(&filter, page).await?;
        print_page(&result);
        self.remember(&filter);
        Ok(())
    }

    async fn export(
        &self,
        args: FilterArgs,
        format: ExportFormat,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let form = self.fill_form(args).await?;
        let filter = form.build_filter()?;
        let output = output.unwrap_or_else(|| PathBuf::from(format.file_name()));
        let bytes = self.client.export_schedules(&filter, format).await?;
        std::fs::write(&output, &bytes)
            .with_context(|| format!("failed to write export to '{}'", output.display()))?;
        info!(path = %output.display(), bytes = bytes.len(), "export written");
        self.remember(&filter);
        Ok(())
    }

    async fn ports(&self, query: &str, country: Option<String>) -> Result<()> {
        let search = PortSearch::new(self.client.clone());
        let query = SuggestionQuery::new(query, self.settings.suggestion_limit)
            .with_country(country);
        print_suggestions(&search, &query).await
    }

    async fn carriers(&self, query: &str) -> Result<()> {
        let search = CarrierSearch::new(self.client.clone());
        let query = SuggestionQuery::new(query, self.settings.suggestion_limit);
        print_suggestions(&search, &query).await
    }

    async fn health(&self) -> Result<()> {
        if self.client.health().await? {
            println!("ok: {}", self.client.base_url());
            Ok(())
        } else {
            bail!("backend at {} reports unhealthy", self.client.base_url())
        }
    }
}

/// Drives a type-ahead field the way typing would: a code commits as is,
/// free text runs the lookup and commits its first suggestion.
/// An empty value clears the field, dropping any restored code.
async fn resolve_code(field: &str, control: &mut TypeaheadController, text: &str) -> Result<()> {
    control.set_text(text);
    if text.trim().is_empty() {
        info!(field, "cleared");
        return Ok(());
    }
    control.settle().await;
    match control.phase().clone() {
        Phase::Results => {
            control.select(0);
        }
        Phase::Empty => bail!("no {field} matches '{text}'"),
        Phase::Error(failure) => {
            bail!("{field} lookup failed: {} ({})", failure.message(), failure.cause())
        }
        Phase::Idle | Phase::Debouncing | Phase::Searching => {
            if control.committed() != Some(text.trim()) {
                bail!("'{text}' is too short to look up a {field}");
            }
        }
    }
    info!(
        field,
        code = control.committed().unwrap_or_default(),
        "resolved"
    );
    Ok(())
}

fn check_display_date(flag: &str, text: &str) -> Result<()> {
    if !text.trim().is_empty() && parse_display(text).is_none() {
        bail!("{flag} expects dd/mm/yyyy, got '{text}'");
    }
    Ok(())
}

async fn print_suggestions(search: &dyn SuggestionSearch, query: &SuggestionQuery) -> Result<()> {
    let items = search
        .search(query)
        .await
        .with_context(|| format!("lookup for '{}' failed", query.text))?;
    if items.is_empty() {
        println!("no matches for '{}'", query.text);
        return Ok(());
    }
    for item in &items {
        let label = highlight(&item.label, &query.text);
        let label = if label.has_match() {
            format!("{}[{}]{}", label.before, label.matched, label.after)
        } else {
            item.label.clone()
        };
        match &item.detail {
            Some(detail) => println!("{:<6} {label}, {detail}", item.code),
            None => println!("{:<6} {label}", item.code),
        }
    }
    Ok(())
}

fn print_page(page: &SchedulePage) {
    println!(
        "{:<6} {:<6} {:<10} {:<10} {:>4}  {:<24} {:<10} {:<6} {:<13}",
        "FROM", "TO", "ETD", "ETA", "DAYS", "VESSEL", "VOYAGE", "CARR", "ROUTING"
    );
    for item in &page.items {
        println!(
            "{:<6} {:<6} {:<10} {:<10} {:>4}  {:<24} {:<10} {:<6} {:<13}",
            item.origin,
            item.destination,
            display_day(&item.etd),
            display_day(&item.eta),
            item.transit_days,
            item.vessel,
            item.voyage,
            item.carrier,
            item.routing_type,
        );
    }
    let pages = page.total.div_ceil(u64::from(page.page_size.max(1)));
    println!(
        "{} schedules, page {} of {}",
        page.total,
        page.page,
        pages.max(1)
    );
}

/// Backend timestamps start with the API date; show them as dd/mm/yyyy.
fn display_day(raw: &str) -> String {
    raw.get(..10)
        .and_then(parse_api)
        .map(format_display)
        .unwrap_or_else(|| raw.to_string())
}
