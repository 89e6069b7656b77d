use std::path::Path;
use std::process::Command as Process;

use chrono::{Local, NaiveDate};
use clap::{Args, CommandFactory, Parser, Subcommand};
use comfy_table::{Attribute, Cell, Color, Table};
use inquire::{Confirm, CustomType, DateSelect, MultiSelect, Password, PasswordDisplayMode, Select, Text};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use billus::amount::{format_amount, format_rupees};
use billus::analytics::{StockStatus, StockThresholds, dashboard_summary, staff_breakdown, stock_report};
use billus::auth::{self, AuthService, SignupForm};
use billus::config::{self, AppSettings, FirebaseConfig};
use billus::draft::{BankField, ClientField, LineItemField};
use billus::firebase::FirebaseClient;
use billus::model::{BusinessDataDocument, BusinessInfo, Employee, PaymentMode, Profile, StockItem, TenantRecord};
use billus::onboarding::{self, CATEGORIES, Step};
use billus::render::{self, InvoiceRenderer, InvoiceTemplate};
use billus::store::FileStore;
use billus::totals::{TaxRates, compute_totals};
use billus::workspace::{Command, Workspace};
use billus::{Error, Result};

// ==========================================
// Constants
// ==========================================
const STATES: &[&str] = &["West Bengal", "Maharashtra", "Delhi", "Karnataka", "Tamil Nadu", "Other"];

const RED: Color = Color::Rgb { r: 185, g: 28, b: 28 };
const GREEN: Color = Color::Rgb { r: 4, g: 120, b: 87 };
const AMBER: Color = Color::Rgb { r: 180, g: 83, b: 9 };

type Auth = AuthService<FirebaseClient, FirebaseClient, FileStore>;

// ==========================================
// CLI
// ==========================================

#[derive(Parser)]
#[command(name = "billus", version, about = "Bills, stock and staff for small businesses")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a business category and enter business details
    Onboard,
    /// Create an account
    Signup,
    /// Log in to an existing account
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Log out and remove local data
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Show the business profile
    Profile {
        /// Edit the profile interactively
        #[arg(long)]
        edit: bool,
    },
    /// Work on the current bill
    Bill {
        #[command(subcommand)]
        action: BillAction,
    },
    /// Manage stock
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Manage employees
    Employee {
        #[command(subcommand)]
        action: EmployeeAction,
    },
    /// Summary of stock, staff and the current bill
    Analysis {
        #[command(flatten)]
        tax: TaxArgs,
    },
    /// Configure data directory, Firebase and stock thresholds
    Config,
}

#[derive(Args)]
struct TaxArgs {
    /// CGST percentage
    #[arg(long, default_value = "0")]
    cgst: String,
    /// SGST percentage
    #[arg(long, default_value = "0")]
    sgst: String,
}

impl TaxArgs {
    fn rates(&self) -> TaxRates {
        TaxRates::from_inputs(&self.cgst, &self.sgst)
    }
}

#[derive(Subcommand)]
enum BillAction {
    /// Print the bill and its totals
    Show {
        #[command(flatten)]
        tax: TaxArgs,
    },
    /// Set a client detail
    Client { field: ClientField, value: String },
    /// Add, edit or remove service rows
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// Set the discount percentage
    Discount { percent: String },
    /// Set the note printed under the bill
    Footer { note: String },
    /// Set the bank details printed on the bill
    Bank { field: BankField, value: String },
    /// Start a new bill (bank details are kept)
    New,
    /// Write the bill as HTML
    Print {
        #[command(flatten)]
        tax: TaxArgs,
        /// Template to use; remembered for next time
        #[arg(long, value_enum)]
        template: Option<InvoiceTemplate>,
        /// Open the file once written
        #[arg(long)]
        open: bool,
    },
}

#[derive(Subcommand)]
enum ItemAction {
    /// Append a row
    Add {
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        staff: Option<String>,
        #[arg(long)]
        rate: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
    },
    /// Set one field of a row
    Set { row: usize, field: LineItemField, value: String },
    /// Remove a row
    Remove { row: usize },
}

#[derive(Subcommand)]
enum StockAction {
    List,
    Add,
    Edit { row: usize },
    Remove { row: usize },
}

#[derive(Subcommand)]
enum EmployeeAction {
    List,
    Add,
    Edit { row: usize },
    Remove { row: usize },
}

// ==========================================
// Main Function
// ==========================================

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help().ok();
        return;
    };

    if let Err(e) = run(command) {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("billus=warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(command: Commands) -> Result<()> {
    let config_path = config::get_config_path();
    let existing = config::load_settings(&config_path)?;

    if let Commands::Config = command {
        setup_config_wizard(&config_path, existing.as_ref())?;
        return Ok(());
    }

    let settings = match existing {
        Some(settings) => settings,
        None => setup_config_wizard(&config_path, None)?,
    };
    let store = FileStore::open(settings.store_dir())?;

    match command {
        Commands::Onboard => onboarding_wizard(&settings, store),
        Commands::Signup => signup_wizard(&settings, store),
        Commands::Login { email } => login(&settings, store, email),
        Commands::Logout => logout(&settings, store),
        Commands::Whoami => {
            whoami(&store);
            Ok(())
        }
        Commands::Profile { edit } => profile(&settings, store, edit),
        Commands::Bill { action } => bill(&settings, store, action),
        Commands::Stock { action } => stock(&settings, store, action),
        Commands::Employee { action } => employees(store, action),
        Commands::Analysis { tax } => {
            show_analysis(&settings, Workspace::open(store).document(), &tax.rates());
            Ok(())
        }
        Commands::Config => Ok(()),
    }
}

fn auth_service(settings: &AppSettings, store: FileStore) -> Result<Auth> {
    let firebase = settings.firebase.as_ref().ok_or_else(|| {
        Error::Config("Firebase is not set up. Run `billus config` first.".into())
    })?;
    let client = FirebaseClient::new(firebase)?;
    Ok(AuthService::new(client.clone(), client, store))
}

/// CLI rows are numbered from 1.
fn row_index(row: usize) -> Result<usize> {
    row.checked_sub(1)
        .ok_or_else(|| Error::validation("Rows are numbered from 1."))
}

fn existing<T: Clone>(items: &[T], row: usize) -> Result<(usize, T)> {
    let index = row_index(row)?;
    let item = items.get(index).cloned().ok_or(Error::IndexOutOfRange {
        index,
        len: items.len(),
    })?;
    Ok((index, item))
}

// ==========================================
// 1. Onboarding & Accounts
// ==========================================

fn onboarding_wizard(settings: &AppSettings, store: FileStore) -> Result<()> {
    let mut workspace = Workspace::open(store);
    let current = workspace.document().onboarding.clone();
    println!("\n🚀 --- Business Onboarding ---");

    let names: Vec<&str> = CATEGORIES.iter().map(|c| c.name).collect();
    let start = names.iter().position(|n| *n == current.category).unwrap_or(0);
    let name = Select::new("Business Category:", names)
        .with_starting_cursor(start)
        .prompt()?;
    let mut answers = onboarding::choose_category(&current, name);

    let category = onboarding::category(name)
        .ok_or_else(|| Error::validation(format!("Unknown category {name}.")))?;
    let defaults: Vec<usize> = category
        .subcategories
        .iter()
        .enumerate()
        .filter(|(_, sub)| answers.subcategories.iter().any(|s| s == **sub))
        .map(|(i, _)| i)
        .collect();
    loop {
        let picked = MultiSelect::new("Business Sub-Categories:", category.subcategories.to_vec())
            .with_default(&defaults)
            .prompt()?;
        answers.subcategories = picked.into_iter().map(str::to_owned).collect();
        if onboarding::can_proceed(Step::Subcategories, &answers) {
            break;
        }
        println!("⚠️  Pick at least one sub-category.");
    }

    let info = &current.business_info;
    answers.business_info = BusinessInfo {
        name: Text::new("Business Name:").with_initial_value(&info.name).prompt()?,
        address: Text::new("Business Address:").with_initial_value(&info.address).prompt()?,
        phone: Text::new("Business Phone:").with_initial_value(&info.phone).prompt()?,
        email: Text::new("Business Email:").with_initial_value(&info.email).prompt()?,
    };
    workspace.execute(Command::SetOnboarding(answers))?;
    println!("✅ Onboarding saved.");

    if settings.firebase.is_some()
        && auth::cached_session(workspace.store()).is_none()
        && Confirm::new("Create your account now?").with_default(true).prompt()?
    {
        return signup_wizard(settings, workspace.into_store());
    }
    Ok(())
}

fn signup_wizard(settings: &AppSettings, store: FileStore) -> Result<()> {
    let mut workspace = Workspace::open(store.clone());
    let mut auth = auth_service(settings, store)?;
    println!("\n📝 --- Create your account ---");

    let form = SignupForm {
        company: Text::new("Company Name:").prompt()?,
        email: Text::new("Email:").prompt()?,
        phone: Text::new("Phone:").prompt()?,
        password: Password::new("Password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .with_help_message("At least 6 characters")
            .prompt()?,
        country: Select::new("State:", STATES.to_vec()).prompt()?.to_owned(),
        accepted_terms: Confirm::new("I agree to the Terms of Service and Privacy Policy")
            .with_default(false)
            .prompt()?,
    };
    let session = auth.signup(&form)?;
    if let Some(tenant) = &session.tenant {
        sync_profile(&mut workspace, tenant)?;
    }
    println!("✅ Account created for {}.", session.principal.email);
    Ok(())
}

fn login(settings: &AppSettings, store: FileStore, email: Option<String>) -> Result<()> {
    let mut workspace = Workspace::open(store.clone());
    let mut auth = auth_service(settings, store)?;
    let email = match email {
        Some(email) => email,
        None => Text::new("Email:").prompt()?,
    };
    let password = Password::new("Password:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;

    let session = auth.login(&email, &password)?;
    match &session.tenant {
        Some(tenant) => {
            sync_profile(&mut workspace, tenant)?;
            println!("✅ Welcome back, {}!", tenant.company);
        }
        None => println!(
            "⚠️  Signed in as {}, but no business record was found. Run `billus signup` to create one.",
            session.principal.email
        ),
    }
    Ok(())
}

fn logout(settings: &AppSettings, mut store: FileStore) -> Result<()> {
    let proceed = Confirm::new("Log out and remove all local business data?")
        .with_default(false)
        .prompt()?;
    if !proceed {
        println!("Cancelled");
        return Ok(());
    }
    // Sign-out is local; an unusable Firebase setup still clears the store.
    let client = settings.firebase.as_ref().and_then(|firebase| {
        FirebaseClient::new(firebase)
            .inspect_err(|e| tracing::warn!(error = %e, "Firebase unavailable, clearing local data only"))
            .ok()
    });
    auth::sign_out(client.as_ref(), &mut store)?;
    println!("👋 Logged out.");
    Ok(())
}

fn whoami(store: &FileStore) {
    match auth::cached_session(store) {
        Some(session) => {
            println!("👤 {} ({})", session.principal.email, session.principal.uid);
            if let Some(tenant) = session.tenant {
                println!("🏢 {}", tenant.company);
            }
        }
        None => println!("Not logged in."),
    }
}

fn profile(settings: &AppSettings, store: FileStore, edit: bool) -> Result<()> {
    let mut workspace = Workspace::open(store.clone());
    let mut auth = auth_service(settings, store)?;
    let record = auth.fetch_profile()?.unwrap_or_default();
    print_profile(&record, &workspace.document().profile);
    if !edit {
        return Ok(());
    }

    let owner_uid = match record.owner_uid.as_str() {
        "" => auth
            .current_session()
            .map(|s| s.principal.uid)
            .unwrap_or_default(),
        uid => uid.to_owned(),
    };
    let start = STATES.iter().position(|s| *s == record.country).unwrap_or(0);
    let updated = TenantRecord {
        company: Text::new("Company:").with_initial_value(&record.company).prompt()?,
        email: Text::new("Email:").with_initial_value(&record.email).prompt()?,
        phone: Text::new("Phone:").with_initial_value(&record.phone).prompt()?,
        country: Select::new("State:", STATES.to_vec())
            .with_starting_cursor(start)
            .prompt()?
            .to_owned(),
        created_at: record.created_at,
        owner_uid,
    };
    let saved = auth.update_profile(&updated)?;
    sync_profile(&mut workspace, &saved)?;
    println!("✅ Profile saved.");
    print_profile(&saved, &workspace.document().profile);
    Ok(())
}

/// Copies account details into the local profile; address and plan stay.
fn sync_profile(workspace: &mut Workspace<FileStore>, tenant: &TenantRecord) -> Result<()> {
    let current = &workspace.document().profile;
    let profile = Profile {
        name: tenant.company.clone(),
        email: tenant.email.clone(),
        phone: tenant.phone.clone(),
        ..current.clone()
    };
    if profile != *current {
        workspace.execute(Command::SetProfile(profile))?;
    }
    Ok(())
}

fn print_profile(record: &TenantRecord, local: &Profile) {
    let mut table = Table::new();
    let created = record
        .created_at
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".into());
    let rows = [
        ("Company", record.company.as_str()),
        ("Email", record.email.as_str()),
        ("Phone", record.phone.as_str()),
        ("State", record.country.as_str()),
        ("Address", local.address.as_str()),
        ("Plan", local.plan.as_str()),
        ("Member since", created.as_str()),
    ];
    for (label, value) in rows {
        table.add_row(vec![
            Cell::new(label).add_attribute(Attribute::Bold),
            Cell::new(value),
        ]);
    }
    println!("{table}");
}

// ==========================================
// 2. Bill
// ==========================================

fn bill(settings: &AppSettings, store: FileStore, action: BillAction) -> Result<()> {
    let mut workspace = Workspace::open(store);
    match action {
        BillAction::Show { tax } => print_bill(workspace.document(), &tax.rates()),
        BillAction::Client { field, value } => {
            let value = match field {
                ClientField::PaymentMode => payment_mode_label(&value)?,
                _ => value,
            };
            workspace.execute(Command::SetClientField { field, value })?;
            println!("✅ Client details updated.");
        }
        BillAction::Item { action } => match action {
            ItemAction::Add {
                description,
                staff,
                rate,
                quantity,
            } => {
                let index = workspace.execute(Command::AddLineItem)?.invoice.line_items.len() - 1;
                let fields = [
                    (LineItemField::Description, description),
                    (LineItemField::Staff, staff),
                    (LineItemField::Rate, rate),
                    (LineItemField::Quantity, quantity),
                ];
                for (field, value) in fields {
                    if let Some(value) = value {
                        workspace.execute(Command::SetLineItemField { index, field, value })?;
                    }
                }
                println!("✅ Added row {}.", index + 1);
            }
            ItemAction::Set { row, field, value } => {
                let index = row_index(row)?;
                workspace.execute(Command::SetLineItemField { index, field, value })?;
                println!("✅ Row {row} updated.");
            }
            ItemAction::Remove { row } => {
                workspace.execute(Command::RemoveLineItem {
                    index: row_index(row)?,
                })?;
                println!("🗑️  Row {row} removed.");
            }
        },
        BillAction::Discount { percent } => {
            workspace.execute(Command::SetDiscountPercent(percent))?;
            println!("✅ Discount updated.");
        }
        BillAction::Footer { note } => {
            workspace.execute(Command::SetFooterNote(note))?;
            println!("✅ Footer updated.");
        }
        BillAction::Bank { field, value } => {
            workspace.execute(Command::SetBankDetails { field, value })?;
            println!("✅ Bank details updated.");
        }
        BillAction::New => {
            let proceed = Confirm::new("Discard the current bill and start a new one?")
                .with_default(false)
                .prompt()?;
            if !proceed {
                println!("Cancelled");
                return Ok(());
            }
            workspace.execute(Command::ResetDraft)?;
            println!("✅ New bill started.");
        }
        BillAction::Print {
            tax,
            template,
            open,
        } => {
            let template = match template {
                Some(template) => {
                    render::remember_template(workspace.store_mut(), template)?;
                    template
                }
                None => render::remembered_template(workspace.store()),
            };
            let path = InvoiceRenderer::new()?.write(
                &settings.output_dir(),
                workspace.document(),
                &tax.rates(),
                template,
                Local::now().date_naive(),
            )?;
            println!("📄 Invoice written: {}", path.display());
            if open {
                open_file(&path);
            }
        }
    }
    Ok(())
}

fn payment_mode_label(value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Ok(String::new());
    }
    PaymentMode::from_label(value)
        .map(|mode| mode.label().to_owned())
        .ok_or_else(|| Error::validation("Payment mode must be Cash, Card or UPI."))
}

fn print_bill(document: &BusinessDataDocument, rates: &TaxRates) {
    let draft = &document.invoice;
    let client = &draft.client;

    println!("\n--- Bill To ---");
    println!(
        "{}",
        if client.name.trim().is_empty() {
            "Client Name"
        } else {
            client.name.as_str()
        }
    );
    let details = [
        ("Address", &client.address),
        ("Contact", &client.contact),
        ("Invoice #", &client.invoice_number),
        ("Date", &client.date),
        ("Payment Mode", &client.payment_mode),
    ];
    for (label, value) in details {
        if !value.trim().is_empty() {
            println!("{label}: {value}");
        }
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Description"),
        Cell::new("Staff"),
        Cell::new("Rate (₹)"),
        Cell::new("Quantity"),
        Cell::new("Subtotal (₹)"),
    ]);
    for (i, item) in draft.line_items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&item.description),
            Cell::new(item.staff_name.as_deref().unwrap_or("-")),
            Cell::new(&item.rate),
            Cell::new(&item.quantity),
            Cell::new(format_amount(item.subtotal())),
        ]);
    }
    println!("{table}");

    let totals = compute_totals(draft, rates);
    let mut summary = Table::new();
    summary.add_row(vec![Cell::new("Subtotal"), Cell::new(format_rupees(totals.subtotal))]);
    summary.add_row(vec![
        Cell::new(format!("Discount ({}%)", totals.discount_percent.normalize())),
        Cell::new(format!("-{}", format_rupees(totals.discount_amount))),
    ]);
    summary.add_row(vec![
        Cell::new(format!("CGST ({}%)", totals.cgst_percent.normalize())),
        Cell::new(format_rupees(totals.cgst_amount)),
    ]);
    summary.add_row(vec![
        Cell::new(format!("SGST ({}%)", totals.sgst_percent.normalize())),
        Cell::new(format_rupees(totals.sgst_amount)),
    ]);
    summary.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(format_rupees(totals.total))
            .add_attribute(Attribute::Bold)
            .fg(GREEN),
    ]);
    println!("{summary}");

    if !draft.footer_note.trim().is_empty() {
        println!("{}", draft.footer_note);
    }
    println!(
        "🏦 {} · A/C {}",
        draft.business_bank.bank_name, draft.business_bank.account_number
    );
}

// ==========================================
// 3. Stock & Employees
// ==========================================

fn stock(settings: &AppSettings, store: FileStore, action: StockAction) -> Result<()> {
    let mut workspace = Workspace::open(store);
    match action {
        StockAction::List => print_stock(&workspace.document().stock, settings.stock),
        StockAction::Add => {
            let item = stock_form(&StockItem::default())?;
            workspace.execute(Command::AddStockItem(item))?;
            println!("✅ Product added.");
        }
        StockAction::Edit { row } => {
            let (index, current) = existing(&workspace.document().stock, row)?;
            let item = stock_form(&current)?;
            workspace.execute(Command::UpdateStockItem { index, item })?;
            println!("✅ Product updated.");
        }
        StockAction::Remove { row } => {
            let (index, current) = existing(&workspace.document().stock, row)?;
            let prompt = format!("Remove {}?", current.name);
            if Confirm::new(&prompt).with_default(false).prompt()? {
                workspace.execute(Command::RemoveStockItem { index })?;
                println!("🗑️  Removed {}.", current.name);
            } else {
                println!("Cancelled");
            }
        }
    }
    Ok(())
}

fn stock_form(current: &StockItem) -> Result<StockItem> {
    Ok(StockItem {
        name: Text::new("Product Name:").with_initial_value(&current.name).prompt()?,
        quantity: Text::new("Quantity:").with_initial_value(&current.quantity).prompt()?,
        price: Text::new("Price (₹):").with_initial_value(&current.price).prompt()?,
    })
}

fn print_stock(items: &[StockItem], thresholds: StockThresholds) {
    if items.is_empty() {
        println!("No products yet. Add one with `billus stock add`.");
        return;
    }
    let report = stock_report(items, thresholds);
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Product"),
        Cell::new("Quantity"),
        Cell::new("Price (₹)"),
        Cell::new("Value (₹)"),
        Cell::new("Status"),
    ]);
    for (i, line) in report.lines.iter().enumerate() {
        let status = Cell::new(line.status.label());
        let status = match line.status {
            StockStatus::OutOfStock | StockStatus::Low => status.fg(RED),
            StockStatus::Overstocked => status.fg(AMBER),
            StockStatus::Ok => status.fg(GREEN),
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&line.name),
            Cell::new(line.quantity.normalize()),
            Cell::new(format_amount(line.price)),
            Cell::new(format_amount(line.value)),
            status,
        ]);
    }
    table.add_row(vec![
        Cell::new(""),
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format_amount(report.total_value)).add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    println!("{table}");
}

fn employees(store: FileStore, action: EmployeeAction) -> Result<()> {
    let mut workspace = Workspace::open(store);
    match action {
        EmployeeAction::List => print_employees(&workspace.document().employees),
        EmployeeAction::Add => {
            let employee = employee_form(&Employee::default())?;
            workspace.execute(Command::AddEmployee(employee))?;
            println!("✅ Employee added.");
        }
        EmployeeAction::Edit { row } => {
            let (index, current) = existing(&workspace.document().employees, row)?;
            let employee = employee_form(&current)?;
            workspace.execute(Command::UpdateEmployee { index, employee })?;
            println!("✅ Employee updated.");
        }
        EmployeeAction::Remove { row } => {
            let (index, current) = existing(&workspace.document().employees, row)?;
            let prompt = format!("Remove {} ({})?", current.name, current.employee_id);
            if Confirm::new(&prompt).with_default(false).prompt()? {
                workspace.execute(Command::RemoveEmployee { index })?;
                println!("🗑️  Removed {}.", current.name);
            } else {
                println!("Cancelled");
            }
        }
    }
    Ok(())
}

fn employee_form(current: &Employee) -> Result<Employee> {
    let joined = NaiveDate::parse_from_str(current.joining_date.trim(), "%Y-%m-%d")
        .unwrap_or_else(|_| Local::now().date_naive());
    Ok(Employee {
        name: Text::new("Name:").with_initial_value(&current.name).prompt()?,
        contact: Text::new("Contact:").with_initial_value(&current.contact).prompt()?,
        employee_id: Text::new("Employee ID:")
            .with_initial_value(&current.employee_id)
            .prompt()?,
        joining_date: DateSelect::new("Joining Date:")
            .with_default(joined)
            .prompt()?
            .format("%Y-%m-%d")
            .to_string(),
        biometric: Text::new("Biometric Reference:")
            .with_initial_value(&current.biometric)
            .with_help_message("Device ID or file name")
            .prompt()?,
        address: Text::new("Address:").with_initial_value(&current.address).prompt()?,
    })
}

fn print_employees(employees: &[Employee]) {
    if employees.is_empty() {
        println!("No employees yet. Add one with `billus employee add`.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Name"),
        Cell::new("ID"),
        Cell::new("Contact"),
        Cell::new("Joined"),
        Cell::new("Biometric"),
        Cell::new("Address"),
    ]);
    for (i, employee) in employees.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&employee.name),
            Cell::new(&employee.employee_id),
            Cell::new(&employee.contact),
            Cell::new(&employee.joining_date),
            Cell::new(&employee.biometric),
            Cell::new(&employee.address),
        ]);
    }
    println!("{table}");
}

// ==========================================
// 4. Analysis
// ==========================================

fn show_analysis(settings: &AppSettings, document: &BusinessDataDocument, rates: &TaxRates) {
    let summary = dashboard_summary(document, rates, settings.stock);

    let attention = |count: usize| {
        let cell = Cell::new(count);
        if count > 0 { cell.fg(RED) } else { cell.fg(GREEN) }
    };
    let mut table = Table::new();
    table.set_header(vec![Cell::new("Metric"), Cell::new("Value")]);
    table.add_row(vec![Cell::new("Products"), Cell::new(summary.stock_items)]);
    table.add_row(vec![Cell::new("Low stock"), attention(summary.low_stock)]);
    table.add_row(vec![Cell::new("Out of stock"), attention(summary.out_of_stock)]);
    table.add_row(vec![Cell::new("Inventory value"), Cell::new(format_rupees(summary.stock_value))]);
    table.add_row(vec![Cell::new("Employees"), Cell::new(summary.employees)]);
    table.add_row(vec![Cell::new("Rows on current bill"), Cell::new(summary.bill_rows)]);
    table.add_row(vec![
        Cell::new("Current bill total").add_attribute(Attribute::Bold),
        Cell::new(format_rupees(summary.bill_total)).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Top service"),
        Cell::new(summary.top_service.as_deref().unwrap_or("-")),
    ]);
    println!("\n📊 --- Business Summary ---");
    println!("{table}");

    let staff = staff_breakdown(&document.invoice);
    if !staff.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![Cell::new("Staff"), Cell::new("Services"), Cell::new("Revenue (₹)")]);
        for row in staff {
            table.add_row(vec![
                Cell::new(row.staff),
                Cell::new(row.services),
                Cell::new(format_amount(row.revenue)),
            ]);
        }
        println!("\n--- Revenue by Staff ---");
        println!("{table}");
    }

    let report = stock_report(&document.stock, settings.stock);
    let flagged: Vec<_> = report
        .lines
        .iter()
        .filter(|line| line.status.needs_attention())
        .collect();
    if !flagged.is_empty() {
        println!("\n⚠️  Stock needing attention:");
        for line in flagged {
            println!("  - {} ({}): {}", line.name, line.quantity.normalize(), line.status.label());
        }
    }
}

// ==========================================
// 5. Configuration & Helpers
// ==========================================

fn setup_config_wizard(path: &Path, current: Option<&AppSettings>) -> Result<AppSettings> {
    println!("\n⚙️  --- Configuration Setup ---");
    let defaults = current.cloned().unwrap_or_default();

    let data_root = Text::new("Root Data Directory:")
        .with_default(&defaults.data_root)
        .prompt()?;

    let firebase = if Confirm::new("Connect a Firebase project for accounts?")
        .with_default(defaults.firebase.is_some())
        .prompt()?
    {
        let existing = defaults.firebase.clone().unwrap_or_default();
        Some(FirebaseConfig {
            api_key: Text::new("Firebase Web API Key:")
                .with_initial_value(&existing.api_key)
                .prompt()?,
            project_id: Text::new("Firebase Project ID:")
                .with_initial_value(&existing.project_id)
                .prompt()?,
        })
    } else {
        None
    };

    let low = CustomType::<u32>::new("Low stock below:")
        .with_default(defaults.stock.low)
        .with_error_message("Enter a whole number")
        .prompt()?;
    let high = CustomType::<u32>::new("Overstocked above:")
        .with_default(defaults.stock.high)
        .with_error_message("Enter a whole number")
        .prompt()?;

    let settings = AppSettings {
        data_root,
        firebase,
        stock: StockThresholds { low, high },
    };
    config::save_settings(path, &settings)?;
    println!("✅ Settings saved.");
    Ok(settings)
}

fn open_file(path: &Path) {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    if let Err(e) = Process::new(opener).arg(path).spawn() {
        tracing::warn!(error = %e, path = %path.display(), "could not open invoice");
    }
}
