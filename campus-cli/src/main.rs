//! Campus CLI - command-line admin console for the institute backend
//!
//! Every command drives one of the console views: it mounts the view, fills
//! its form from the arguments and submits it. Alerts and confirmations go
//! through the terminal; logs go to stderr.

mod terminal;

use campus_api::{ApiClient, FileSessionStore, SessionStore};
use campus_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success,
    performance::measure_async, CampusConfig, CampusError, CampusResult, EntityId, ErrorContext,
};
use campus_core::{Batch, Course, Student, Subject, Teacher};
use campus_views::{
    AdminRegisterView, BatchDetailView, BatchEditor, CourseEditor, DetailView, ListView,
    LoginView, Navigation, Resource, StudentRegisterView, SubjectEditor, TeacherEditView,
    TeacherFilters, TeacherListView, TeacherRegisterView, ViewError, ViewResult,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use terminal::{prompt_line, TerminalNotifier};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "campus")]
#[command(about = "Admin console for the training institute backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    yes: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(long)]
        username: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Inspect or clear the stored session
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// First-run administrator setup
    Admin {
        #[command(subcommand)]
        action: AdminCommand,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommand,
    },

    /// Manage subjects
    Subject {
        #[command(subcommand)]
        action: SubjectCommand,
    },

    /// Manage batches and their rosters
    Batch {
        #[command(subcommand)]
        action: BatchCommand,
    },

    /// Manage teachers
    Teacher {
        #[command(subcommand)]
        action: TeacherCommand,
    },

    /// Manage students
    Student {
        #[command(subcommand)]
        action: StudentCommand,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

impl Commands {
    fn operation(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "login",
            Commands::Session { .. } => "session",
            Commands::Admin { .. } => "admin",
            Commands::Course { .. } => "course",
            Commands::Subject { .. } => "subject",
            Commands::Batch { .. } => "batch",
            Commands::Teacher { .. } => "teacher",
            Commands::Student { .. } => "student",
            Commands::Config { .. } => "config",
        }
    }
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Print the stored session
    Show,
    /// Forget the stored session
    Clear,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Register the first administrator
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum CourseCommand {
    List,
    Show { id: EntityId },
    Create(CourseArgs),
    Edit {
        id: EntityId,
        #[command(flatten)]
        fields: CourseArgs,
    },
    Delete { id: EntityId },
}

#[derive(Args)]
struct CourseArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Duration in days
    #[arg(long)]
    duration: Option<String>,
    /// Subject id; repeat for several
    #[arg(long = "subject")]
    subjects: Vec<EntityId>,
}

#[derive(Subcommand)]
enum SubjectCommand {
    List,
    Show {
        id: EntityId,
    },
    Create {
        #[arg(long)]
        name: Option<String>,
    },
    Edit {
        id: EntityId,
        #[arg(long)]
        name: Option<String>,
    },
    Delete {
        id: EntityId,
    },
}

#[derive(Subcommand)]
enum BatchCommand {
    List,
    /// Show a batch with its roster and the teachers that can be assigned
    Show {
        id: EntityId,
    },
    Create(BatchArgs),
    Edit {
        id: EntityId,
        #[command(flatten)]
        fields: BatchArgs,
    },
    Delete {
        id: EntityId,
    },
    AssignTeacher {
        id: EntityId,
        #[arg(long)]
        teacher: EntityId,
    },
    RemoveTeacher {
        id: EntityId,
        teacher: EntityId,
    },
    RemoveStudent {
        id: EntityId,
        student: EntityId,
    },
}

#[derive(Args)]
struct BatchArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    code: Option<String>,
    /// Course id
    #[arg(long)]
    course: Option<EntityId>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,
}

#[derive(Subcommand)]
enum TeacherCommand {
    List {
        /// Only teachers of this subject
        #[arg(long)]
        subject: Option<EntityId>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: EntityId,
    },
    Register {
        #[command(flatten)]
        fields: TeacherArgs,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    Edit {
        id: EntityId,
        #[command(flatten)]
        fields: TeacherArgs,
    },
    Delete {
        id: EntityId,
    },
}

#[derive(Args)]
struct TeacherArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    qualifications: Option<String>,
    #[arg(long)]
    experience: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    dob: Option<String>,
    #[arg(long)]
    address: Option<String>,
    /// Subject id; repeat for several
    #[arg(long = "subject")]
    subjects: Vec<EntityId>,
    /// Profile picture
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Subcommand)]
enum StudentCommand {
    List,
    Show { id: EntityId },
    Register(StudentArgs),
    Delete { id: EntityId },
}

#[derive(Args)]
struct StudentArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Prompted for when omitted
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    roll_no: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    dob: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    /// Date of admission (YYYY-MM-DD)
    #[arg(long)]
    admitted: Option<String>,
    /// Batch id
    #[arg(long)]
    batch: Option<EntityId>,
    /// Profile picture
    #[arg(long)]
    image: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let mut logging_config = config.logging.clone();
    if cli.verbose {
        logging_config = logging_config.verbose();
    }
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("❌ Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting campus console v{}", env!("CARGO_PKG_VERSION"));

    let operation = cli.command.operation();
    log_operation_start!(operation);
    match measure_async(operation, run(cli, config)).await {
        Ok(()) => {
            log_operation_success!(operation);
        }
        Err(e) => {
            log_operation_error!(operation, e);
            report(&e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, config: CampusConfig) -> ViewResult<()> {
    if let Commands::Config {
        show,
        init,
        validate,
    } = cli.command
    {
        return Ok(handle_config(show, init, validate, cli.config.as_ref(), &config)?);
    }

    let api = build_client(&config, cli.yes)?;
    match cli.command {
        Commands::Login { username, password } => handle_login(api, username, password).await,
        Commands::Session { action } => handle_session(api, action).await,
        Commands::Admin { action } => handle_admin(api, action).await,
        Commands::Course { action } => handle_course(api, action).await,
        Commands::Subject { action } => handle_subject(api, action).await,
        Commands::Batch { action } => handle_batch(api, action).await,
        Commands::Teacher { action } => handle_teacher(api, action).await,
        Commands::Student { action } => handle_student(api, action).await,
        Commands::Config { .. } => Ok(()),
    }
}

fn load_config(config_path: Option<&PathBuf>) -> CampusResult<CampusConfig> {
    if let Some(path) = config_path {
        return CampusConfig::from_file(path);
    }

    let default_paths = [
        dirs::config_dir().map(|d| d.join("campus").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".campus").join("config.toml")),
        Some(PathBuf::from("campus.toml")),
    ];

    for path in default_paths.iter().flatten() {
        if path.exists() {
            return CampusConfig::from_file(path);
        }
    }

    Ok(CampusConfig::default())
}

fn default_config_path() -> CampusResult<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|d| d.join("campus").join("config.toml"))
        .ok_or_else(|| campus_core::config_error!("Cannot determine a configuration directory", "cli"))
}

fn session_path(config: &CampusConfig) -> CampusResult<PathBuf> {
    if let Some(path) = &config.session.path {
        return Ok(path.clone());
    }
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|d| d.join("campus").join("session.json"))
        .ok_or_else(|| CampusError::Config {
            message: "Cannot determine where to store the session".to_string(),
            source: None,
            context: ErrorContext::new("cli")
                .with_operation("session_path")
                .with_suggestion("Set session.path in the configuration file"),
        })
}

fn build_client(config: &CampusConfig, assume_yes: bool) -> CampusResult<ApiClient> {
    let path = session_path(config)?;
    debug!(session = ?path, base_url = %config.api.base_url, "Building API client");
    ApiClient::new(
        config.api.clone(),
        Arc::new(FileSessionStore::new(path)),
        Arc::new(TerminalNotifier::new(assume_yes)),
    )
}

fn report(error: &ViewError) {
    for line in report_lines(error) {
        eprintln!("{}", line);
    }
}

/// Lines shown after a failed command. API failures were already logged by
/// `log_operation_error!` and usually notified by the view, so only the
/// recovery suggestions are added here.
fn report_lines(error: &ViewError) -> Vec<String> {
    match error {
        ViewError::Invalid(errors) => {
            let mut lines = vec!["❌ Please fix the following fields:".to_string()];
            lines.extend(
                errors
                    .iter()
                    .map(|field| format!("   {}: {}", field.field, field.message)),
            );
            lines
        }
        ViewError::Cancelled => vec!["Cancelled".to_string()],
        ViewError::Api(e) => e
            .context()
            .map(|context| {
                context
                    .recovery_suggestions
                    .iter()
                    .map(|suggestion| format!("   💡 {}", suggestion))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> ViewResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(CampusError::from)?;
    println!("{}", text);
    Ok(())
}

fn print_navigation(target: Navigation) {
    println!("➡️  {}", target);
}

fn password_or_prompt(password: Option<String>) -> ViewResult<String> {
    match password {
        Some(password) => Ok(password),
        None => Ok(prompt_line("Password: ").map_err(CampusError::from)?),
    }
}

fn apply<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

async fn list_records<R: Resource + Serialize>(api: ApiClient) -> ViewResult<()> {
    let mut view = ListView::<R>::new(api);
    view.mount().await?;
    print_json(&view.items)
}

async fn show_record<R: Resource + Serialize>(api: ApiClient, id: EntityId) -> ViewResult<()> {
    let mut view = DetailView::<R>::new(api, id);
    view.mount().await?;
    print_json(&view.record)
}

async fn delete_record<R: Resource>(api: ApiClient, id: EntityId) -> ViewResult<()> {
    let target = DetailView::<R>::new(api, id).delete().await?;
    print_navigation(target);
    Ok(())
}

async fn handle_login(api: ApiClient, username: String, password: Option<String>) -> ViewResult<()> {
    let mut view = LoginView::new(api);
    view.form.username = username;
    view.form.password = password_or_prompt(password)?;
    let target = view.submit().await?;
    print_navigation(target);
    Ok(())
}

async fn handle_session(api: ApiClient, action: SessionCommand) -> ViewResult<()> {
    let store = api.session();
    match action {
        SessionCommand::Show => {
            let mut session = store.load().await?;
            // Only show whether a token is held, never the token itself
            session.token = session.token.map(|_| "********".to_string());
            print_json(&session)
        }
        SessionCommand::Clear => {
            store.clear().await?;
            println!("🧹 Session cleared");
            Ok(())
        }
    }
}

async fn handle_admin(api: ApiClient, action: AdminCommand) -> ViewResult<()> {
    match action {
        AdminCommand::Register {
            username,
            email,
            password,
        } => {
            let mut view = AdminRegisterView::new(api);
            if let Some(target) = view.mount().await? {
                println!("An administrator already exists");
                print_navigation(target);
                return Ok(());
            }
            view.form.username = username;
            view.form.email = email;
            view.form.password = password_or_prompt(password)?;
            let target = view.submit().await?;
            print_navigation(target);
            Ok(())
        }
    }
}

async fn handle_course(api: ApiClient, action: CourseCommand) -> ViewResult<()> {
    match action {
        CourseCommand::List => list_records::<Course>(api).await,
        CourseCommand::Show { id } => show_record::<Course>(api, id).await,
        CourseCommand::Delete { id } => delete_record::<Course>(api, id).await,
        CourseCommand::Create(fields) => submit_course(CourseEditor::create(api), fields).await,
        CourseCommand::Edit { id, fields } => {
            submit_course(CourseEditor::edit(api, id), fields).await
        }
    }
}

async fn submit_course(mut editor: CourseEditor, fields: CourseArgs) -> ViewResult<()> {
    editor.mount().await?;
    apply(&mut editor.form.title, fields.title);
    apply(&mut editor.form.description, fields.description);
    apply(&mut editor.form.duration, fields.duration);
    if !fields.subjects.is_empty() {
        editor.form.fk_subject = fields.subjects;
    }
    let target = editor.submit().await?;
    print_navigation(target);
    Ok(())
}

async fn handle_subject(api: ApiClient, action: SubjectCommand) -> ViewResult<()> {
    let mut editor = match action {
        SubjectCommand::List => return list_records::<Subject>(api).await,
        SubjectCommand::Show { id } => return show_record::<Subject>(api, id).await,
        SubjectCommand::Delete { id } => return delete_record::<Subject>(api, id).await,
        SubjectCommand::Create { name } => {
            let mut editor = SubjectEditor::create(api);
            apply(&mut editor.form.name, name);
            editor
        }
        SubjectCommand::Edit { id, name } => {
            let mut editor = SubjectEditor::edit(api, id);
            editor.mount().await?;
            apply(&mut editor.form.name, name);
            editor
        }
    };

    let target = editor.submit().await?;
    print_navigation(target);
    Ok(())
}

async fn handle_batch(api: ApiClient, action: BatchCommand) -> ViewResult<()> {
    match action {
        BatchCommand::List => list_records::<Batch>(api).await,
        BatchCommand::Delete { id } => delete_record::<Batch>(api, id).await,
        BatchCommand::Show { id } => {
            let mut view = BatchDetailView::new(api, id);
            view.mount().await?;
            print_json(&view.batch)?;
            println!("Eligible teachers:");
            print_json(&view.eligible_teachers)
        }
        BatchCommand::Create(fields) => submit_batch(BatchEditor::create(api), fields).await,
        BatchCommand::Edit { id, fields } => submit_batch(BatchEditor::edit(api, id), fields).await,
        BatchCommand::AssignTeacher { id, teacher } => {
            let mut view = BatchDetailView::new(api, id);
            view.select_teacher(Some(teacher));
            view.assign_teacher().await?;
            print_json(&view.batch.teacher_list)
        }
        BatchCommand::RemoveTeacher { id, teacher } => {
            let mut view = BatchDetailView::new(api, id);
            view.remove_teacher(teacher).await?;
            print_json(&view.batch.teacher_list)
        }
        BatchCommand::RemoveStudent { id, student } => {
            let mut view = BatchDetailView::new(api, id);
            view.remove_student(student).await?;
            print_json(&view.batch.student_list)
        }
    }
}

async fn submit_batch(mut editor: BatchEditor, fields: BatchArgs) -> ViewResult<()> {
    editor.mount().await?;
    apply(&mut editor.form.batch_name, fields.name);
    apply(&mut editor.form.batch_code, fields.code);
    if fields.course.is_some() {
        editor.form.fk_course = fields.course;
    }
    apply(&mut editor.form.start_date, fields.start);
    apply(&mut editor.form.end_date, fields.end);
    let target = editor.submit().await?;
    print_navigation(target);
    Ok(())
}

async fn handle_teacher(api: ApiClient, action: TeacherCommand) -> ViewResult<()> {
    match action {
        TeacherCommand::List {
            subject,
            gender,
            search,
        } => {
            let filters = TeacherFilters {
                subject,
                gender,
                search,
            };
            let mut view = TeacherListView::new(api, filters);
            view.mount().await?;
            print_json(&view.teachers.items)
        }
        TeacherCommand::Show { id } => show_record::<Teacher>(api, id).await,
        TeacherCommand::Delete { id } => delete_record::<Teacher>(api, id).await,
        TeacherCommand::Register { fields, password } => {
            let mut view = TeacherRegisterView::new(api);
            view.mount().await?;
            let form = &mut view.form;
            apply(&mut form.username, fields.username);
            apply(&mut form.email, fields.email);
            form.password = password_or_prompt(password)?;
            apply(&mut form.full_name, fields.full_name);
            apply(&mut form.phone_number, fields.phone);
            apply(&mut form.qualifications, fields.qualifications);
            apply(&mut form.years_of_experience, fields.experience);
            apply(&mut form.gender, fields.gender);
            apply(&mut form.date_of_birth, fields.dob);
            apply(&mut form.address, fields.address);
            form.subjects = fields.subjects;
            form.image = fields.image;

            let target = view.submit().await?;
            print_navigation(target);
            Ok(())
        }
        TeacherCommand::Edit { id, fields } => {
            let mut view = TeacherEditView::new(api, id);
            view.mount().await?;
            let form = &mut view.form;
            apply(&mut form.username, fields.username);
            apply(&mut form.email, fields.email);
            apply(&mut form.full_name, fields.full_name);
            apply(&mut form.phone_number, fields.phone);
            apply(&mut form.qualifications, fields.qualifications);
            apply(&mut form.years_of_experience, fields.experience);
            apply(&mut form.gender, fields.gender);
            apply(&mut form.date_of_birth, fields.dob);
            apply(&mut form.address, fields.address);
            if !fields.subjects.is_empty() {
                form.subjects = fields.subjects;
            }
            form.image = fields.image;

            let target = view.submit().await?;
            print_navigation(target);
            Ok(())
        }
    }
}

async fn handle_student(api: ApiClient, action: StudentCommand) -> ViewResult<()> {
    match action {
        StudentCommand::List => list_records::<Student>(api).await,
        StudentCommand::Show { id } => show_record::<Student>(api, id).await,
        StudentCommand::Delete { id } => delete_record::<Student>(api, id).await,
        StudentCommand::Register(fields) => {
            let mut view = StudentRegisterView::new(api);
            view.mount().await?;
            let form = &mut view.form;
            apply(&mut form.username, fields.username);
            apply(&mut form.email, fields.email);
            form.password = password_or_prompt(fields.password)?;
            apply(&mut form.full_name, fields.full_name);
            apply(&mut form.roll_no, fields.roll_no);
            apply(&mut form.date_of_birth, fields.dob);
            apply(&mut form.phone_number, fields.phone);
            apply(&mut form.address, fields.address);
            apply(&mut form.gender, fields.gender);
            apply(&mut form.date_of_admission, fields.admitted);
            form.batch = fields.batch;
            form.image = fields.image;

            let target = view.submit().await?;
            print_navigation(target);
            Ok(())
        }
    }
}

fn handle_config(
    show: bool,
    init: bool,
    validate: bool,
    config_path: Option<&PathBuf>,
    config: &CampusConfig,
) -> CampusResult<()> {
    if init {
        let path = match config_path {
            Some(path) => path.clone(),
            None => default_config_path()?,
        };
        CampusConfig::default().save_to_file(&path)?;
        println!("✅ Configuration initialized at: {:?}", path);
        println!("📝 Edit api.base_url to point at your backend.");
    }

    if show {
        let text = toml::to_string_pretty(config).map_err(|e| CampusError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("cli").with_operation("show_config"),
        })?;
        println!("📋 Current configuration:");
        println!("{}", text);
    }

    if validate {
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
