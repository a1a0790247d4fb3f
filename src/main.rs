use clap::{Args, Parser, Subcommand};
use log::warn;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use backoffice::api::{BackofficeApi, Debt, ExpenseKind, HttpApi, PaymentMethod, Product};
use backoffice::config::{config_dir, load_config, resolve_output_dir, Config, CONFIG_TEMPLATE};
use backoffice::error::{BackofficeError, Result};
use backoffice::export::{export_filename, write_export, DisplayContext, Tabular};
use backoffice::format::{format_money, format_quantity, format_timestamp, parse_day, parse_offset};
use backoffice::pages::{
    DebtsPage, ExpensesPage, HistoryFilter, SortOrder, SupplyFilter, SupplyHistoryPage,
};
use backoffice::sync::Outcome;

#[derive(Parser)]
#[command(name = "backoffice")]
#[command(version, about = "Minimal CLI back-office for supply, expense and debt records", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.backoffice or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Override api.base_url for this invocation
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Log requests and refreshes (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show the active configuration
    Status,

    /// Stock replenishment history
    Supplies {
        #[command(subcommand)]
        command: SupplyCommand,
    },

    /// Open expenses, history and categories
    Expenses {
        #[command(subcommand)]
        command: ExpenseCommand,
    },

    /// Customer debts and payments
    Debts {
        #[command(subcommand)]
        command: DebtCommand,
    },
}

#[derive(Args)]
struct ExportArgs {
    /// Write the listed records to a CSV file
    #[arg(long)]
    csv: bool,

    /// Write a printable HTML document
    #[arg(long)]
    html: bool,

    /// Open the HTML document with the system viewer
    #[arg(long, requires = "html")]
    open: bool,
}

#[derive(Subcommand)]
enum SupplyCommand {
    /// List supply records with server-side filters
    List {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Only records registered by this user id
        #[arg(long)]
        user: Option<String>,

        /// Only this product id
        #[arg(long, conflicts_with = "product")]
        product_id: Option<String>,

        /// Product name or code; the first match is used
        #[arg(long)]
        product: Option<String>,

        #[arg(long, value_enum, default_value_t = SortOrder::Newest)]
        order: SortOrder,

        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Page size: 10, 20 or 50
        #[arg(long, default_value_t = 20, value_parser = parse_page_size)]
        limit: u32,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Search products by name or code
    Products { query: String },
}

#[derive(Subcommand)]
enum ExpenseCommand {
    /// Open expenses (first 5) and their total
    List,

    /// Full expense history with local filters
    History {
        /// Text matched against id, description, category, type and date
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long = "type", value_enum)]
        kind: Option<ExpenseKind>,

        #[arg(long)]
        category: Option<String>,

        /// First payment day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last payment day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Register a paid expense
    Add {
        #[arg(long = "type", value_enum, default_value_t = ExpenseKind::Fixed)]
        kind: ExpenseKind,

        /// Category name; created if it does not exist yet
        #[arg(long)]
        category: Option<String>,

        #[arg(short, long)]
        description: String,

        /// Amount (a decimal comma is accepted)
        #[arg(short, long, allow_hyphen_values = true)]
        amount: String,
    },

    /// Change an open expense
    Edit {
        id: String,

        #[arg(long = "type", value_enum)]
        kind: Option<ExpenseKind>,

        #[arg(long)]
        category: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,
    },

    /// Delete an open expense
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List expense categories
    Categories,
}

#[derive(Subcommand)]
enum DebtCommand {
    /// List debts
    List {
        /// Match client name, note or status
        #[arg(short, long)]
        search: Option<String>,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Show one debt with its items
    Show { id: String },

    /// Register a payment (defaults to the full remaining balance)
    Pay {
        id: String,

        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,

        #[arg(short, long, value_enum, default_value_t = PaymentMethod::Cash)]
        method: PaymentMethod,
    },

    /// Keep the debt list on screen, refreshing periodically
    Watch {
        #[arg(short, long)]
        search: Option<String>,
    },
}

fn parse_page_size(value: &str) -> std::result::Result<u32, String> {
    match value.parse::<u32>() {
        Ok(n) if backoffice::pages::supplies::PAGE_SIZES.contains(&n) => Ok(n),
        _ => Err("page size must be 10, 20 or 50".to_string()),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir, cli.api_url.as_deref()),
        Commands::Supplies { command } => {
            let session = Session::open(&cfg_dir, cli.api_url.as_deref())?;
            match command {
                SupplyCommand::List {
                    from,
                    to,
                    user,
                    product_id,
                    product,
                    order,
                    page,
                    limit,
                    export,
                } => {
                    let filters = SupplyArgs {
                        from,
                        to,
                        user,
                        product_id,
                        product,
                        order,
                        page,
                        limit,
                    };
                    cmd_supplies_list(&session, filters, &export)
                }
                SupplyCommand::Products { query } => cmd_supplies_products(&session, &query),
            }
        }
        Commands::Expenses { command } => {
            let session = Session::open(&cfg_dir, cli.api_url.as_deref())?;
            match command {
                ExpenseCommand::List => cmd_expenses_list(&session),
                ExpenseCommand::History {
                    search,
                    kind,
                    category,
                    from,
                    to,
                    export,
                } => {
                    let filter = HistoryFilter {
                        search: search.unwrap_or_default(),
                        kind: kind.map(|k| k.as_str().to_string()),
                        category,
                        from: from.as_deref().map(parse_day).transpose()?,
                        to: to.as_deref().map(parse_day).transpose()?,
                    };
                    cmd_expenses_history(&session, filter, &export)
                }
                ExpenseCommand::Add {
                    kind,
                    category,
                    description,
                    amount,
                } => cmd_expenses_add(&session, kind, category, description, amount),
                ExpenseCommand::Edit {
                    id,
                    kind,
                    category,
                    description,
                    amount,
                } => cmd_expenses_edit(&session, &id, kind, category, description, amount),
                ExpenseCommand::Delete { id, yes } => cmd_expenses_delete(&session, &id, yes),
                ExpenseCommand::Categories => cmd_expenses_categories(&session),
            }
        }
        Commands::Debts { command } => {
            let session = Session::open(&cfg_dir, cli.api_url.as_deref())?;
            match command {
                DebtCommand::List { search, export } => {
                    cmd_debts_list(&session, search.as_deref(), &export)
                }
                DebtCommand::Show { id } => cmd_debts_show(&session, &id),
                DebtCommand::Pay { id, amount, method } => {
                    cmd_debts_pay(&session, &id, amount, method)
                }
                DebtCommand::Watch { search } => cmd_debts_watch(&session, search.as_deref()),
            }
        }
    }
}

/// Everything a data command needs: loaded config, the API client and the
/// display settings
struct Session {
    cfg_dir: PathBuf,
    config: Config,
    api: HttpApi,
    ctx: DisplayContext,
}

impl Session {
    fn open(cfg_dir: &Path, api_url: Option<&str>) -> Result<Self> {
        let config = load_config(cfg_dir)?;
        let base_url = api_url.unwrap_or(&config.api.base_url);
        let api = HttpApi::new(base_url, config.api.timeout());
        log::debug!("using API at {}", api.base_url());
        let ctx = DisplayContext {
            currency_symbol: config.display.currency_symbol.clone(),
            offset: parse_offset(&config.display.utc_offset),
        };
        Ok(Self {
            cfg_dir: cfg_dir.to_path_buf(),
            config,
            api,
            ctx,
        })
    }

    fn money(&self, value: f64) -> String {
        format_money(value, &self.ctx.currency_symbol)
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(BackofficeError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("exports"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized backoffice config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point it at your API:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Check the settings:    backoffice status");
    println!();
    println!("Then try:");
    println!("  backoffice debts list");

    Ok(())
}

/// Show the active configuration. Makes no request.
fn cmd_status(cfg_dir: &Path, api_url: Option<&str>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BackofficeError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    let config = load_config(cfg_dir)?;

    println!("Backoffice Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    match api_url {
        Some(url) => println!("API:              {} (override)", url),
        None => println!("API:              {}", config.api.base_url),
    }
    println!("Timeout:          {}s", config.api.timeout_secs);
    println!(
        "Refresh:          every {}s (backoff up to {}s)",
        config.refresh.poll_interval_secs, config.refresh.max_backoff_secs
    );
    println!("Currency:         {}", config.display.currency_symbol);
    println!(
        "Exports:          {}",
        resolve_output_dir(&config.export.output_dir, cfg_dir).display()
    );
    println!(
        "Operator:         {}",
        config.operator.user_id.as_deref().unwrap_or("(not set)")
    );

    Ok(())
}

/// Render any exportable list as a table, using the display values
fn records_table<R: Tabular>(rows: &[R], ctx: &DisplayContext) -> String {
    let mut builder = Builder::default();
    builder.push_record(R::headers().iter().map(|h| h.to_uppercase()));
    for row in rows {
        builder.push_record(row.cells(ctx).iter().map(|c| c.display().to_string()));
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Turn a failed page load into a command error
fn ensure_loaded(outcome: Outcome, error: Option<&str>) -> Result<()> {
    match outcome {
        Outcome::Failed => Err(BackofficeError::LoadFailed(
            error.unwrap_or("Load failed").to_string(),
        )),
        Outcome::Applied | Outcome::Stale => Ok(()),
    }
}

fn write_exports(
    session: &Session,
    args: &ExportArgs,
    dataset: &str,
    csv: Option<String>,
    html: Option<String>,
) -> Result<()> {
    let dir = resolve_output_dir(&session.config.export.output_dir, &session.cfg_dir);
    let today = chrono::Local::now().date_naive();

    if let Some(content) = csv {
        let path = write_export(&dir, &export_filename(dataset, today, "csv"), &content)?;
        println!("  Saved: {}", path.display());
    }
    if let Some(content) = html {
        let path = write_export(&dir, &export_filename(dataset, today, "html"), &content)?;
        println!("  Saved: {}", path.display());
        if args.open {
            open_path(&path)?;
        }
    }
    Ok(())
}

fn open_path(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", path.to_str().unwrap_or("")])
            .spawn()?;
    }
    Ok(())
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CODE")]
    code: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            code: product.code.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
}

#[derive(Tabled)]
struct DebtItemRow {
    #[tabled(rename = "PRODUCT")]
    product: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "UNIT PRICE")]
    unit_price: String,
    #[tabled(rename = "SUBTOTAL")]
    subtotal: String,
}

struct SupplyArgs {
    from: Option<String>,
    to: Option<String>,
    user: Option<String>,
    product_id: Option<String>,
    product: Option<String>,
    order: SortOrder,
    page: u32,
    limit: u32,
}

/// Type the query into the product field and wait for the debounced lookup
fn lookup_products<A: BackofficeApi + ?Sized>(
    page: &mut SupplyHistoryPage<'_, A>,
    query: &str,
) -> Vec<Product> {
    page.product_input(query, Instant::now());
    while let Some(deadline) = page.lookup_deadline() {
        thread::sleep(deadline.saturating_duration_since(Instant::now()));
        if page.poll_lookup(Instant::now()) {
            break;
        }
    }
    page.suggestions().to_vec()
}

fn cmd_supplies_list(session: &Session, args: SupplyArgs, export: &ExportArgs) -> Result<()> {
    let from = args.from.as_deref().map(parse_day).transpose()?;
    let to = args.to.as_deref().map(parse_day).transpose()?;

    let mut page = SupplyHistoryPage::new(&session.api, &session.config.lookup);
    page.set_filter(SupplyFilter::DateFrom, from.as_deref());
    page.set_filter(SupplyFilter::DateTo, to.as_deref());
    page.set_filter(SupplyFilter::User, args.user.as_deref());
    page.set_filter(SupplyFilter::Product, args.product_id.as_deref());

    if let Some(text) = args.product.as_deref() {
        let found = lookup_products(&mut page, text);
        let product = found.first().ok_or_else(|| {
            BackofficeError::Validation(format!("No product matches '{}'", text))
        })?;
        page.select_product(product);
        println!("Product: {}", page.product_text());
    }

    page.set_order(args.order);
    page.set_page_size(args.limit);
    page.set_page(args.page);

    let outcome = page.load();
    page.unmount();
    ensure_loaded(outcome, page.error())?;

    if page.items().is_empty() {
        println!("No supply records found.");
    } else {
        println!("{}", records_table(page.items(), &session.ctx));
    }
    let total_qty: f64 = page.items().iter().map(|r| r.quantity).sum();
    let total_cost: f64 = page.items().iter().map(|r| r.total_cost).sum();
    println!(
        "Page {} · {} records · quantity {} · cost {}",
        page.page(),
        page.items().len(),
        format_quantity(total_qty),
        session.money(total_cost)
    );
    if page.can_next() {
        println!("More results: --page {}", page.page() + 1);
    }

    let csv = if export.csv {
        Some(page.export_csv(&session.ctx)?)
    } else {
        None
    };
    let html = export.html.then(|| page.export_html(&session.ctx));
    write_exports(session, export, "supplies", csv, html)
}

fn cmd_supplies_products(session: &Session, query: &str) -> Result<()> {
    let mut page = SupplyHistoryPage::new(&session.api, &session.config.lookup);
    let found = lookup_products(&mut page, query);
    page.unmount();

    if found.is_empty() {
        println!("No products match '{}'.", query);
        return Ok(());
    }
    let rows: Vec<ProductRow> = found.iter().map(ProductRow::from).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

fn cmd_expenses_list(session: &Session) -> Result<()> {
    let mut page = ExpensesPage::new(&session.api);
    let outcome = page.load();
    ensure_loaded(outcome, page.error())?;

    if page.items().is_empty() {
        println!("No open expenses.");
    } else {
        println!("{}", records_table(page.compact_items(), &session.ctx));
        println!("{}", page.compact_summary());
    }
    println!("Total: {}", session.money(page.total()));
    Ok(())
}

fn cmd_expenses_history(session: &Session, filter: HistoryFilter, export: &ExportArgs) -> Result<()> {
    let mut page = ExpensesPage::new(&session.api);
    page.open_history();
    *page.history_filter_mut() = filter;

    let shown = page.history_view();
    let total: f64 = shown.iter().map(|e| e.amount).sum();
    if shown.is_empty() {
        println!("No expenses found.");
    } else {
        let rows: Vec<_> = shown.into_iter().cloned().collect();
        println!("{}", records_table(&rows, &session.ctx));
        println!("{} records · total {}", rows.len(), session.money(total));
    }

    let csv = if export.csv {
        Some(page.export_history_csv(&session.ctx)?)
    } else {
        None
    };
    let html = export.html.then(|| page.export_history_html(&session.ctx));
    write_exports(session, export, "expenses", csv, html)
}

fn cmd_expenses_add(
    session: &Session,
    kind: ExpenseKind,
    category: Option<String>,
    description: String,
    amount: String,
) -> Result<()> {
    let mut page = ExpensesPage::new(&session.api);
    if category.is_none() {
        if let Err(e) = page.load_categories() {
            warn!("could not load expense categories: {e}");
        }
    }
    page.start_create();
    if let Some(draft) = page.draft_mut() {
        draft.kind = kind;
        if let Some(category) = category {
            draft.category = category;
        }
        draft.description = description;
        draft.amount = amount;
    }

    let saved = page.submit(chrono::Local::now().date_naive())?;
    println!(
        "Added expense {}: {} ({})",
        saved.id,
        saved.description.as_deref().unwrap_or("-"),
        session.money(saved.amount)
    );
    println!("Open expenses total: {}", session.money(page.total()));
    Ok(())
}

fn cmd_expenses_edit(
    session: &Session,
    id: &str,
    kind: Option<ExpenseKind>,
    category: Option<String>,
    description: Option<String>,
    amount: Option<String>,
) -> Result<()> {
    let mut page = ExpensesPage::new(&session.api);
    let outcome = page.load();
    ensure_loaded(outcome, page.error())?;
    if let Err(e) = page.load_categories() {
        warn!("could not load expense categories: {e}");
    }
    page.start_edit(id)?;
    if let Some(draft) = page.draft_mut() {
        if let Some(kind) = kind {
            draft.kind = kind;
        }
        if let Some(category) = category {
            draft.category = category;
        }
        if let Some(description) = description {
            draft.description = description;
        }
        if let Some(amount) = amount {
            draft.amount = amount;
        }
    }

    let saved = page.submit(chrono::Local::now().date_naive())?;
    println!(
        "Updated expense {}: {} ({})",
        saved.id,
        saved.description.as_deref().unwrap_or("-"),
        session.money(saved.amount)
    );
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn cmd_expenses_delete(session: &Session, id: &str, yes: bool) -> Result<()> {
    let mut page = ExpensesPage::new(&session.api);
    page.ask_delete(id);

    if !yes && !confirm(&format!("Delete expense {id}?"))? {
        page.cancel_delete();
        println!("Cancelled.");
        return Ok(());
    }

    page.confirm_delete()?;
    println!("Deleted expense {id}");
    println!("Open expenses total: {}", session.money(page.total()));
    Ok(())
}

fn cmd_expenses_categories(session: &Session) -> Result<()> {
    let mut page = ExpensesPage::new(&session.api);
    let categories = page.load_categories()?;

    if categories.is_empty() {
        println!("No expense categories yet.");
        return Ok(());
    }
    let rows: Vec<CategoryRow> = categories
        .iter()
        .map(|c| CategoryRow {
            id: c.id.clone(),
            name: c.name.clone(),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

fn debts_page(session: &Session) -> DebtsPage<'_, HttpApi> {
    DebtsPage::new(
        &session.api,
        &session.config.refresh,
        &session.config.lookup,
        session.config.operator.user_id.clone(),
    )
}

fn print_debts(session: &Session, debts: &[Debt]) {
    if debts.is_empty() {
        println!("No debts found.");
        return;
    }
    println!("{}", records_table(debts, &session.ctx));
    let owed: f64 = debts.iter().map(Debt::remaining).sum();
    println!("{} debts · outstanding {}", debts.len(), session.money(owed));
}

fn cmd_debts_list(session: &Session, search: Option<&str>, export: &ExportArgs) -> Result<()> {
    let mut page = debts_page(session);
    let outcome = page.load();
    ensure_loaded(outcome, page.error())?;
    if let Some(query) = search {
        page.set_search(query);
    }

    let shown: Vec<Debt> = page.filtered().into_iter().cloned().collect();
    print_debts(session, &shown);

    let csv = if export.csv {
        Some(page.export_csv(&session.ctx)?)
    } else {
        None
    };
    let html = export.html.then(|| page.export_html(&session.ctx));
    write_exports(session, export, "debts", csv, html)
}

fn cmd_debts_show(session: &Session, id: &str) -> Result<()> {
    let mut page = debts_page(session);
    let outcome = page.load();
    if outcome == Outcome::Failed {
        warn!("debt list unavailable: {}", page.error().unwrap_or("-"));
    }
    let detail = page.open_detail(id)?;
    let debt = &detail.debt;

    println!("{}", debt.title());
    println!("{}", "-".repeat(50));
    println!("Client:    {}", debt.client_name.as_deref().unwrap_or("-"));
    println!("Seller:    {}", debt.seller_name.as_deref().unwrap_or("-"));
    println!(
        "Date:      {}",
        format_timestamp(debt.created_on.as_deref().unwrap_or(""), session.ctx.offset)
    );
    println!("Status:    {}", debt.status.as_deref().unwrap_or("-"));
    println!("Total:     {}", session.money(debt.total));
    println!("Paid:      {}", session.money(debt.paid));
    println!("Remaining: {}", session.money(debt.remaining()));
    if let Some(note) = debt.note.as_deref().filter(|n| !n.is_empty()) {
        println!("Note:      {}", note);
    }

    if !debt.items.is_empty() {
        let rows: Vec<DebtItemRow> = debt
            .items
            .iter()
            .map(|item| DebtItemRow {
                product: item.product_name.clone().unwrap_or_default(),
                quantity: format_quantity(item.quantity),
                unit_price: session.money(item.unit_price),
                subtotal: session.money(item.subtotal),
            })
            .collect();
        println!();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }
    if let Some(error) = detail.error.as_deref() {
        println!();
        println!("Could not load full detail: {error}");
    }
    Ok(())
}

fn cmd_debts_pay(
    session: &Session,
    id: &str,
    amount: Option<String>,
    method: PaymentMethod,
) -> Result<()> {
    let mut page = debts_page(session);
    let outcome = page.load();
    ensure_loaded(outcome, page.error())?;

    page.open_payment(id)?;
    if let Some(draft) = page.payment_mut() {
        if let Some(amount) = amount {
            draft.amount = amount;
        }
        draft.method = method;
    }
    let receipt = page.submit_payment()?;
    println!(
        "Registered payment of {} ({}) on debt {}",
        session.money(receipt.amount),
        receipt.method,
        id
    );
    if let Some(debt) = page.debts().iter().find(|d| d.id == id) {
        println!("Remaining: {}", session.money(debt.remaining()));
    }
    Ok(())
}

/// Lines typed on stdin, read on a separate thread so the refresh loop can
/// wait on them with a timeout
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn render_watch(session: &Session, page: &DebtsPage<'_, HttpApi>) {
    println!();
    println!(
        "Debts at {}",
        chrono::Local::now().format("%d/%m/%Y %H:%M:%S")
    );
    if let Some(error) = page.error() {
        println!("Refresh failed: {error}");
    }
    let shown: Vec<Debt> = page.filtered().into_iter().cloned().collect();
    print_debts(session, &shown);
    if !page.search().is_empty() {
        println!("Search: \"{}\"", page.search());
    }
    println!("[Enter] refresh · /text search · q quit");
}

fn cmd_debts_watch(session: &Session, search: Option<&str>) -> Result<()> {
    let mut page = debts_page(session);
    if let Some(query) = search {
        page.set_search(query);
    }
    page.mount(Instant::now());
    render_watch(session, &page);

    let mut input = Some(spawn_stdin_reader());
    while page.is_mounted() {
        let wait = page
            .next_wake(Instant::now())
            .unwrap_or(Duration::from_secs(1));

        let line = match input.as_ref() {
            Some(rx) => match rx.recv_timeout(wait) {
                Ok(line) => Some(line),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => {
                    input = None;
                    None
                }
            },
            None => {
                thread::sleep(wait);
                None
            }
        };

        let now = Instant::now();
        if let Some(line) = line {
            let line = line.trim();
            if line == "q" || line == "quit" {
                break;
            } else if let Some(query) = line.strip_prefix('/') {
                page.search_input(query, now);
            } else if page.on_focus(now).is_some() {
                render_watch(session, &page);
            }
        }

        if page.poll_search(now) {
            render_watch(session, &page);
        }
        if page.tick(now).is_some() {
            render_watch(session, &page);
        }
    }

    page.unmount();
    Ok(())
}
