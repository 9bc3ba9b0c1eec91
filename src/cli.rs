// src/cli.rs
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::analysis::{AnalysisRequest, AnalysisService};
use crate::app_log;
use crate::auth::AuthSession;
use crate::config::ClientConfig;
use crate::core::{ApiClient, StateDatabase, StateMedium};
use crate::filter::{QuickFilters, SortOrder};
use crate::services::drafts::DraftListQuery;
use crate::services::smart_search::KeywordScheme;
use crate::services::{
    CompanyService, DraftService, Entity, OssService, SmartSearchService, TalentService,
};
use crate::store::{
    Clock, JdAnalysisStore, LibraryStore, PersistedSlice, ProjectStore, SystemClock, TalentStore,
};
use crate::tree::{self, NavigationTree, TreeLevel, TreeSnapshot};
use crate::types::candidate::Candidate;
use crate::types::company::EntityForm;
use crate::types::draft::DraftFieldPath;

#[derive(Parser)]
#[command(name = "talentdesk")]
#[command(about = "Command-line client for the recruiting pipeline backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Backend base URL, e.g. http://localhost:8000/api
    #[arg(long, env = "TALENTDESK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// SQLite file holding the local client state
    #[arg(long, env = "TALENTDESK_STATE_DB", global = true)]
    pub state_db: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and remember the session
    Login {
        username: String,
        #[arg(long, env = "TALENTDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Companies, projects and positions
    #[command(subcommand)]
    Tree(TreeCommand),
    /// Candidates
    #[command(subcommand)]
    Talent(TalentCommand),
    /// Uploaded resumes awaiting review
    #[command(subcommand)]
    Draft(DraftCommand),
    /// Analyze a job description, from a local file or object storage
    Analyze {
        file: Option<PathBuf>,
        #[arg(long, conflicts_with = "file")]
        oss: Option<String>,
        /// Extra context sent along with the document
        #[arg(long)]
        info: Option<String>,
    },
    /// Search automation queue
    #[command(subcommand)]
    Search(SearchCommand),
    /// Object-storage browser
    #[command(subcommand)]
    Oss(OssCommand),
    /// Local caches
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Subcommand)]
pub enum TreeCommand {
    /// Print the tree with expansion and selection markers
    Show,
    /// Toggle a company or project open/closed
    Expand { level: LevelArg, id: i64 },
    /// Collapse every node
    Collapse,
    /// Scope candidate lists to one position
    Select { position_id: i64 },
    /// Drop the position scope
    Clear,
    /// Flat project list with totals
    Projects {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    #[command(subcommand)]
    Company(EntityCommand),
    #[command(subcommand)]
    Project(EntityCommand),
    #[command(subcommand)]
    Position(EntityCommand),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LevelArg {
    Company,
    Project,
}

#[derive(Subcommand)]
pub enum EntityCommand {
    Add {
        name: String,
        /// Company id for a project, project id for a position
        #[arg(long)]
        parent: Option<i64>,
        #[arg(long)]
        description: Option<String>,
    },
    Rename {
        id: i64,
        name: String,
    },
    Rm {
        id: i64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Asc => SortOrder::Asc,
            SortArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Args, Default)]
pub struct QuickFilterArgs {
    #[arg(long)]
    pub skills: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub position: Option<String>,
    #[arg(long)]
    pub experience: Option<String>,
}

impl QuickFilterArgs {
    fn into_filters(self) -> QuickFilters {
        QuickFilters {
            skills: self.skills.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            position: self.position.unwrap_or_default(),
            experience: self.experience.unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
pub enum TalentCommand {
    /// Fetch and print the current page (or the selected position's candidates)
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sort: Option<SortArg>,
        #[command(flatten)]
        quick: QuickFilterArgs,
        /// Use the cached list when it is still fresh
        #[arg(long)]
        cached: bool,
    },
    Show {
        id: i64,
    },
    Rm {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Counts over the loaded candidates
    Stats,
    /// Remember a candidate as the current one
    Select {
        id: Option<i64>,
    },
    AddToPositions {
        #[arg(long, value_delimiter = ',', required = true)]
        candidates: Vec<i64>,
        #[arg(long, value_delimiter = ',', required = true)]
        positions: Vec<i64>,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

#[derive(Subcommand)]
pub enum DraftCommand {
    Upload {
        file: PathBuf,
        #[arg(long)]
        position: Option<i64>,
    },
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        status: Option<String>,
    },
    Show {
        id: i64,
    },
    /// Edit one field, e.g. `basic_info.chinese_name` or `work_experiences[0].position`
    Set {
        id: i64,
        path: String,
        /// JSON value; bare text is taken as a string
        value: String,
    },
    Confirm {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    Rm {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[derive(Subcommand)]
pub enum SearchCommand {
    /// Queue a keyword search, optionally tied to the selected position
    Trigger {
        #[arg(long, default_value = "default")]
        name: String,
        #[arg(long, value_delimiter = ',')]
        main: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        position: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        company: Vec<String>,
        #[arg(long)]
        task_id: Option<String>,
    },
    Queue,
    ClearQueue,
}

#[derive(Subcommand)]
pub enum OssCommand {
    /// List a folder (the current one when omitted)
    Ls {
        path: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Back,
    Forward,
    Home,
    /// Toggle a file in the selection used by `rm` and `get-batch`
    Select {
        path: String,
    },
    Upload {
        file: PathBuf,
    },
    Mkdir {
        name: String,
    },
    Mv {
        path: String,
        new_name: String,
    },
    Rm {
        paths: Vec<String>,
    },
    Get {
        path: String,
    },
    GetBatch {
        paths: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Drop the short-lived candidate cache
    Clear,
}

/// Everything a command needs, built once per invocation.
struct App {
    config: ClientConfig,
    medium: StateMedium,
    clock: Arc<dyn Clock>,
    client: ApiClient,
}

impl App {
    async fn init(cli: &Cli) -> Result<Self> {
        let mut config = ClientConfig::load()?;
        if let Some(url) = &cli.api_url {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = &cli.state_db {
            config.state_db_path = path.clone();
        }
        config.ensure_directories().await?;

        let db = StateDatabase::new(&config.state_db_path).await?;
        let medium = StateMedium::from(db);
        let session = AuthSession::restore(medium.clone()).await;
        let client = ApiClient::new(&config, session).context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            medium,
            clock: Arc::new(SystemClock),
            client,
        })
    }

    async fn talent_store(&self) -> TalentStore {
        TalentStore::open(
            self.medium.clone(),
            self.clock.clone(),
            self.config.cache_ttl(),
            self.config.page_size,
        )
        .await
    }

    fn tree_slice(&self) -> PersistedSlice<TreeSnapshot> {
        PersistedSlice::new(tree::STORAGE_KEY, self.medium.clone()).with_clock(self.clock.clone())
    }

    /// Fetch the tree, restore expansion, and keep the talent scope in step
    /// with whatever selection still resolves.
    async fn load_tree(&self, talent: &mut TalentStore) -> Result<NavigationTree> {
        let mut tree = NavigationTree::new();
        self.tree_slice().load_into(&mut tree).await;
        CompanyService::new(self.client.clone())
            .refresh(&mut tree)
            .await
            .context("Failed to load companies")?;

        tree.restore_selection(talent.filters().selected_position.clone());
        talent.sync_scope(&tree).await;

        ProjectStore::open(self.medium.clone(), self.clock.clone())
            .await
            .sync_from_companies(tree.companies())
            .await;
        Ok(tree)
    }

    async fn save_tree(&self, tree: &NavigationTree) {
        self.tree_slice().save_state(tree).await;
    }
}

pub async fn handle_command(cli: Cli) -> Result<()> {
    let app = App::init(&cli).await?;

    match cli.command {
        Command::Login { username, password } => {
            app.client.login(&username, &password).await?;
            println!("Logged in as {}", username);
        }
        Command::Logout => {
            app.client.logout().await;
            println!("Logged out");
        }
        Command::Whoami => whoami(&app),
        Command::Tree(command) => handle_tree(&app, command).await?,
        Command::Talent(command) => handle_talent(&app, command).await?,
        Command::Draft(command) => handle_draft(&app, command).await?,
        Command::Analyze { file, oss, info } => handle_analyze(&app, file, oss, info).await?,
        Command::Search(command) => handle_search(&app, command).await?,
        Command::Oss(command) => handle_oss(&app, command).await?,
        Command::Cache(CacheCommand::Clear) => {
            app.talent_store().await.clear_cache().await;
            println!("Candidate cache cleared");
        }
    }
    Ok(())
}

fn whoami(app: &App) {
    let session = app.client.session();
    match session.username() {
        Some(name) => {
            println!("{}", name);
            if let Some(exp) = session.expires_at() {
                let state = if session.is_expired(chrono::Utc::now()) {
                    "expired"
                } else {
                    "expires"
                };
                println!("token {} {}", state, exp.to_rfc3339());
            }
        }
        None => println!("not logged in"),
    }
}

async fn handle_tree(app: &App, command: TreeCommand) -> Result<()> {
    let mut talent = app.talent_store().await;
    let mut tree = app.load_tree(&mut talent).await?;
    let companies = CompanyService::new(app.client.clone());

    match command {
        TreeCommand::Show => {}
        TreeCommand::Expand { level, id } => {
            let level = match level {
                LevelArg::Company => TreeLevel::Company,
                LevelArg::Project => TreeLevel::Project,
            };
            tree.toggle_expand(level, id);
        }
        TreeCommand::Collapse => tree.collapse_all(),
        TreeCommand::Select { position_id } => {
            let scope = tree
                .select_position(position_id)
                .with_context(|| format!("position {} not found", position_id))?;
            if let Some((_, project, company)) = tree.find_position(position_id) {
                let (company_id, project_id) = (company.id, project.id);
                if !tree.is_expanded(TreeLevel::Company, company_id) {
                    tree.toggle_expand(TreeLevel::Company, company_id);
                }
                if !tree.is_expanded(TreeLevel::Project, project_id) {
                    tree.toggle_expand(TreeLevel::Project, project_id);
                }
            }
            println!("Selected {}", scope.label());
            talent.set_selected_position(Some(scope)).await;
        }
        TreeCommand::Clear => {
            tree.clear_selection();
            talent.set_selected_position(None).await;
        }
        TreeCommand::Projects { status, search } => {
            let mut projects = ProjectStore::open(app.medium.clone(), app.clock.clone()).await;
            projects.set_filters(status, search).await;
            for p in projects.filtered() {
                println!(
                    "[{}] {} / {}  status={}  positions={}  hired={}/{}",
                    p.id,
                    p.company_name,
                    p.name,
                    p.status.as_deref().unwrap_or("-"),
                    p.positions,
                    p.hired,
                    p.candidates
                );
            }
            let stats = projects.stats();
            println!(
                "{} projects, {} active, {} completed, {} positions, success rate {:.1}%",
                stats.total_projects,
                stats.active_projects,
                stats.completed_projects,
                stats.total_positions,
                stats.success_rate
            );
            return Ok(());
        }
        TreeCommand::Company(command) => {
            edit_entity(&companies, &mut tree, Entity::Company, command).await?
        }
        TreeCommand::Project(command) => {
            edit_entity(&companies, &mut tree, Entity::Project, command).await?
        }
        TreeCommand::Position(command) => {
            edit_entity(&companies, &mut tree, Entity::Position, command).await?
        }
    }

    talent.sync_scope(&tree).await;
    app.save_tree(&tree).await;
    print_tree(&tree);
    Ok(())
}

async fn edit_entity(
    service: &CompanyService,
    tree: &mut NavigationTree,
    entity: Entity,
    command: EntityCommand,
) -> Result<()> {
    match command {
        EntityCommand::Add {
            name,
            parent,
            description,
        } => {
            let form = EntityForm {
                description,
                ..EntityForm::named(name)
            };
            match (entity, parent) {
                (Entity::Company, _) => service.create_company(tree, &form).await?,
                (Entity::Project, Some(company_id)) => {
                    service.create_project(tree, company_id, &form).await?
                }
                (Entity::Position, Some(project_id)) => {
                    service.create_position(tree, project_id, &form).await?
                }
                (_, None) => anyhow::bail!("--parent is required for {:?}", entity),
            }
        }
        EntityCommand::Rename { id, name } => {
            service
                .update(tree, entity, id, &EntityForm::named(name))
                .await?
        }
        EntityCommand::Rm { id } => service.delete(tree, entity, id).await?,
    }
    Ok(())
}

fn print_tree(tree: &NavigationTree) {
    let selected = tree.selection().map(|s| s.position_id);
    for company in tree.companies() {
        let open = tree.is_expanded(TreeLevel::Company, company.id);
        println!("{} [{}] {}", marker(open), company.id, company.name);
        if !open {
            continue;
        }
        for project in &company.projects {
            let open = tree.is_expanded(TreeLevel::Project, project.id);
            println!("  {} [{}] {}", marker(open), project.id, project.name);
            if !open {
                continue;
            }
            for position in &project.positions {
                let mark = if selected == Some(position.id) { "*" } else { " " };
                println!("    {} [{}] {}", mark, position.id, position.name);
            }
        }
    }
    if let Some(scope) = tree.selection() {
        println!("scope: {}", scope.label());
    }
}

fn marker(open: bool) -> &'static str {
    if open {
        "-"
    } else {
        "+"
    }
}

fn print_candidates(candidates: &[Candidate]) {
    for c in candidates {
        println!(
            "[{}] {}  {}  {}  {}",
            c.id,
            c.display_name(),
            c.current_city.as_deref().unwrap_or("-"),
            c.expected_position.as_deref().unwrap_or("-"),
            c.skills.join(", ")
        );
    }
}

async fn handle_talent(app: &App, command: TalentCommand) -> Result<()> {
    let mut store = app.talent_store().await;
    let service = TalentService::new(app.client.clone());

    match command {
        TalentCommand::List {
            page,
            search,
            sort,
            quick,
            cached,
        } => {
            if let Some(search) = search {
                store.set_search_keyword(search).await;
            }
            if let Some(sort) = sort {
                store.set_sort_order(sort.into()).await;
            }
            if let Some(page) = page {
                store.set_page(page).await;
            }
            let quick = quick.into_filters();
            if quick.is_empty() {
                store.clear_quick_filters();
            } else {
                store.set_quick_filters(quick);
            }

            // any query flag above has already invalidated the cached page
            if !(cached && store.served_from_cache()) {
                service.refresh(&mut store).await?;
            }

            print_candidates(store.filtered());
            let state = store.state();
            match &state.filters.selected_position {
                Some(scope) => println!("{} candidates for {}", state.filtered.len(), scope.label()),
                None => println!(
                    "page {}/{} ({} total)",
                    state.current_page, state.total_pages, state.total_count
                ),
            }
        }
        TalentCommand::Show { id } => {
            let candidate = service.detail(id).await?;
            println!("{}", serde_json::to_string_pretty(&candidate)?);
            store.select_candidate(Some(id)).await;
            store.set_selected_talent(Some(candidate));
        }
        TalentCommand::Rm { ids } => {
            if let [id] = ids.as_slice() {
                service.delete(*id).await?;
                store.remove_candidate(*id).await;
                println!("Deleted candidate {}", id);
            } else {
                for id in &ids {
                    store.toggle_selected(*id);
                }
                let outcome = service.delete_selected(&mut store).await?;
                println!("Deleted {} candidates", outcome.deleted.len());
                if !outcome.failed.is_empty() {
                    println!("Not deleted: {:?}", outcome.failed);
                }
            }
        }
        TalentCommand::Stats => {
            let stats = store.stats();
            println!("{} candidates", stats.total);
            print_counts("by city", &stats.by_city);
            print_counts("by career stage", &stats.by_career_stage);
            print_counts("top skills", &stats.top_skills);
        }
        TalentCommand::Select { id } => {
            store.select_candidate(id).await;
            match id {
                Some(id) => println!("Selected candidate {}", id),
                None => println!("Selection cleared"),
            }
        }
        TalentCommand::AddToPositions {
            candidates,
            positions,
            notes,
        } => {
            let summary = service
                .add_to_positions(&candidates, &positions, &notes)
                .await?;
            println!(
                "Added {} of {}",
                summary.succeeded,
                summary.succeeded + summary.failed
            );
        }
    }
    Ok(())
}

fn print_counts(title: &str, counts: &[(String, usize)]) {
    println!("{}:", title);
    for (name, count) in counts {
        println!("  {:<24} {}", name, count);
    }
}

async fn handle_draft(app: &App, command: DraftCommand) -> Result<()> {
    let service = DraftService::new(app.client.clone());
    let list_query = DraftListQuery {
        page_size: app.config.page_size,
        ..DraftListQuery::default()
    };

    match command {
        DraftCommand::Upload { file, position } => {
            let id = service.upload(&file, position).await?;
            println!("Draft {} created", id);
        }
        DraftCommand::List { page, status } => {
            let page = service
                .list(&DraftListQuery {
                    page,
                    status,
                    ..list_query
                })
                .await?;
            print_drafts(&page);
        }
        DraftCommand::Show { id } => {
            let draft = service.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        DraftCommand::Set { id, path, value } => {
            let path: DraftFieldPath = path.parse()?;
            let value = serde_json::from_str(&value)
                .unwrap_or(serde_json::Value::String(value));
            service.patch(id, &path, value).await?;
            println!("Draft {} updated", id);
        }
        DraftCommand::Confirm { ids } => {
            let page = match ids.as_slice() {
                [id] => service.confirm(*id, &list_query).await?,
                _ => service.batch_confirm(&ids, &list_query).await?,
            };
            println!("Confirmed {} drafts", ids.len());
            print_drafts(&page);
        }
        DraftCommand::Rm { ids } => {
            match ids.as_slice() {
                [id] => service.delete(*id).await?,
                _ => service.batch_delete(&ids).await?,
            }
            println!("Deleted {} drafts", ids.len());
        }
    }
    Ok(())
}

fn print_drafts(page: &crate::services::DraftPage) {
    for draft in &page.drafts {
        println!(
            "[{}] {}  {}  {}",
            draft.id,
            draft
                .draft_status
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            draft.basic_info.chinese_name.as_deref().unwrap_or("-"),
            draft.file_name.as_deref().unwrap_or("-")
        );
    }
    println!("{} drafts total", page.pagination.total);
}

async fn handle_analyze(
    app: &App,
    file: Option<PathBuf>,
    oss: Option<String>,
    info: Option<String>,
) -> Result<()> {
    let request = match (file, oss) {
        (Some(file), None) => AnalysisRequest::local(file),
        (None, Some(path)) => AnalysisRequest::oss(path),
        _ => anyhow::bail!("give either a file or --oss <path>"),
    };
    let request = match info {
        Some(info) => request.with_info(info),
        None => request,
    };

    let store = JdAnalysisStore::open(app.medium.clone(), app.clock.clone()).await;
    let service = AnalysisService::new(app.client.clone(), Arc::new(Mutex::new(store)));

    let run = service.analyze(request);
    tokio::pin!(run);
    let outcome = tokio::select! {
        outcome = &mut run => outcome,
        _ = tokio::signal::ctrl_c() => {
            app_log!(info, "Interrupted, cancelling analysis");
            service.cancel().await;
            run.await
        }
    };

    match outcome {
        Ok(outcome) => {
            if !outcome.is_complete() {
                println!("Only part of the analysis arrived; showing what there is.");
            }
            println!("{}", serde_json::to_string_pretty(outcome.result())?);
            Ok(())
        }
        Err(e) if e.is_notice() => {
            println!("{}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn handle_search(app: &App, command: SearchCommand) -> Result<()> {
    let service = SmartSearchService::new(app.client.clone());

    match command {
        SearchCommand::Trigger {
            name,
            main,
            position,
            company,
            task_id,
        } => {
            let scheme = KeywordScheme {
                name,
                main,
                position,
                company,
            };
            let talent = app.talent_store().await;
            let scope = talent.filters().selected_position.as_ref();
            let task_id = service.trigger(&scheme, task_id, scope).await?;
            println!("Queued task {}", task_id);
        }
        SearchCommand::Queue => {
            let status = service.queue_status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        SearchCommand::ClearQueue => {
            service.clear_queue().await?;
            println!("Queue cleared");
        }
    }
    Ok(())
}

async fn handle_oss(app: &App, command: OssCommand) -> Result<()> {
    let service = OssService::new(app.client.clone());
    let mut library = LibraryStore::open(app.medium.clone(), app.clock.clone()).await;

    match command {
        OssCommand::Ls { path, search } => {
            if let Some(path) = path {
                library.navigate_to(path).await;
            }
            if let Some(search) = search {
                library.set_search_term(search).await;
            }
        }
        OssCommand::Back => {
            if !library.go_back().await {
                println!("Already at the oldest folder");
            }
        }
        OssCommand::Forward => {
            if !library.go_forward().await {
                println!("Already at the newest folder");
            }
        }
        OssCommand::Home => library.go_home().await,
        OssCommand::Select { path } => {
            let selected = library.toggle_selection(&path).await;
            println!("{} {}", if selected { "selected" } else { "unselected" }, path);
            return Ok(());
        }
        OssCommand::Upload { file } => {
            service.upload(&file, library.current_path()).await?;
        }
        OssCommand::Mkdir { name } => {
            service.create_folder(library.current_path(), &name).await?;
        }
        OssCommand::Mv { path, new_name } => service.rename(&path, &new_name).await?,
        OssCommand::Rm { paths } => {
            let paths = selection_or(paths, &library);
            service.delete(&paths).await?;
            library.clear_selection().await;
        }
        OssCommand::Get { path } => {
            let target = service.download(&path, &app.config.download_dir).await?;
            println!("Saved {}", target.display());
            return Ok(());
        }
        OssCommand::GetBatch { paths } => {
            let paths = selection_or(paths, &library);
            let target = service
                .download_batch(&paths, &app.config.download_dir)
                .await?;
            println!("Saved {}", target.display());
            return Ok(());
        }
    }

    service.refresh(&mut library).await?;
    println!("/{}", library.current_path());
    for file in library.filtered_files() {
        let mark = if library.is_selected(&file.path) { "*" } else { " " };
        let kind = if file.is_directory { "dir " } else { "file" };
        println!("{} {} {:>10}  {}", mark, kind, file.size, file.name);
    }
    Ok(())
}

fn selection_or(paths: Vec<String>, library: &LibraryStore) -> Vec<String> {
    if paths.is_empty() {
        library.selected_files().to_vec()
    } else {
        paths
    }
}
