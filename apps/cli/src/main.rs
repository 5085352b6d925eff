mod logging;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rpide_assets::{Progress, VanillaAssets};
use rpide_project::{
    create_pack, Command, EntryKind, NewEntryKind, Outcome, PackFormat, Project, ProjectHash,
    ProjectStore, SystemShell, Tab, Workbench, PACK_FORMATS,
};
use rpide_settings::{AppPaths, PreferencesStore, Theme};

#[derive(Parser)]
#[command(
    name = "rpide-cli",
    about = "Utility commands for rpide resource-pack projects",
    author,
    version
)]
struct Cli {
    /// 應用程式資料夾；預設為系統資料目錄。 / Application data directory (defaults to the platform data dir).
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,
    /// 遊戲安裝目錄。 / Game install directory (holds `versions/` and `resourcepacks/`).
    #[arg(long, global = true, value_name = "PATH")]
    game_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 管理最近開啟的專案。 / Manage recently opened projects.
    #[command(subcommand)]
    Projects(ProjectsCommand),
    /// 列出專案檔案樹。 / Print the file tree of a project directory.
    Tree(TreeArgs),
    /// 顯示項目的右鍵選單。 / Show the context menu offered for an entry.
    Menu(EntryArgs),
    /// 以分頁方式開啟檔案並顯示資訊。 / Open a file as a tab and describe it.
    Tab(EntryArgs),
    /// 建立新檔案。 / Create an empty file.
    NewFile(EntryArgs),
    /// 建立新資料夾。 / Create a folder.
    NewFolder(EntryArgs),
    /// 將項目移至垃圾桶。 / Move an entry to the trash.
    Trash(EntryArgs),
    /// 建立新的資源包。 / Create a new resource pack and register it as a project.
    CreatePack(CreatePackArgs),
    /// 列出已知的資源包格式。 / List known pack formats.
    PackFormats,
    /// 原版資源快取。 / Vanilla asset cache.
    #[command(subcommand)]
    Assets(AssetsCommand),
    /// 檢視或修改偏好設定。 / Show or change preferences.
    #[command(subcommand)]
    Preferences(PreferencesCommand),
}

#[derive(Subcommand)]
enum ProjectsCommand {
    /// 依最近開啟時間列出專案。 / List projects, most recently opened first.
    List,
    /// 開啟專案並記錄。 / Open a project directory and record it.
    Open {
        /// 資源包根目錄。 / Resource-pack root directory.
        root: PathBuf,
    },
    /// 顯示專案紀錄。 / Print the stored record of a project.
    Show {
        /// 專案雜湊值。 / Project hash as printed by `projects list`.
        hash: String,
    },
}

#[derive(Args)]
struct TreeArgs {
    /// 專案根目錄。 / Project root directory.
    root: PathBuf,
    /// 要展開的資料夾（相對路徑，可重複）。 / Folder to expand, relative to the root (repeatable).
    #[arg(long, value_name = "REL")]
    expand: Vec<PathBuf>,
}

#[derive(Args)]
struct EntryArgs {
    /// 目標路徑。 / Target path.
    path: PathBuf,
    /// 專案根目錄；預設為目標的上層資料夾。 / Project root (defaults to the target's parent folder).
    #[arg(long, value_name = "PATH")]
    project: Option<PathBuf>,
}

#[derive(Args)]
struct CreatePackArgs {
    /// 資源包名稱（資料夾名稱）。 / Pack name, also used as the folder name.
    name: String,
    /// 建立位置；預設為遊戲的 resourcepacks 資料夾。 / Parent folder (defaults to the game's resourcepacks folder).
    #[arg(long, value_name = "PATH")]
    location: Option<PathBuf>,
    /// 資源包格式編號。 / Pack format number (defaults to the newest known format).
    #[arg(long, value_name = "N")]
    pack_format: Option<u32>,
    /// 資源包描述。 / Pack description.
    #[arg(long, default_value = "")]
    description: String,
}

#[derive(Subcommand)]
enum AssetsCommand {
    /// 從遊戲 jar 擷取原版資源。 / Extract vanilla assets from the game jar.
    Extract {
        /// 遊戲版本，例如 1.16.5。 / Game version, e.g. 1.16.5.
        version: String,
        /// 即使已有快取也重新擷取。 / Extract again even when cached.
        #[arg(long)]
        force: bool,
    },
    /// 顯示資源在快取中的路徑。 / Print where a resource lives in the cache.
    Path {
        /// 遊戲版本。 / Game version.
        version: String,
        /// 資源路徑，例如 assets/minecraft/textures/block/stone.png。 / Resource path inside the pack.
        resource: String,
    },
}

#[derive(Subcommand)]
enum PreferencesCommand {
    /// 以 JSON 顯示偏好設定。 / Print preferences as JSON.
    Show,
    /// 修改偏好設定。 / Change preferences.
    Set(PreferencesSetArgs),
}

#[derive(Args)]
struct PreferencesSetArgs {
    /// 縮排寬度（1-8）。 / Indent width (1-8).
    #[arg(long)]
    indent_size: Option<u8>,
    /// 是否以空白縮排。 / Indent with spaces instead of tabs.
    #[arg(long, value_name = "true|false")]
    insert_spaces: Option<bool>,
    /// 介面主題。 / UI theme.
    #[arg(long)]
    theme: Option<ThemeChoice>,
    /// 預設遊戲目錄。 / Game directory used when `--game-dir` is not given.
    #[arg(long, value_name = "PATH")]
    default_game_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeChoice {
    Dark,
    Light,
}

impl From<ThemeChoice> for Theme {
    fn from(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Dark => Theme::Dark,
            ThemeChoice::Light => Theme::Light,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        data_dir,
        game_dir,
        command,
    } = Cli::parse();
    let paths = resolve_paths(data_dir, game_dir)?;
    let _logging = logging::init(&paths.logs_dir());

    match command {
        Commands::Projects(subcommand) => execute_projects_command(subcommand, &paths),
        Commands::Tree(args) => execute_tree(args, &paths),
        Commands::Menu(args) => execute_menu(args, &paths),
        Commands::Tab(args) => execute_tab(args, &paths),
        Commands::NewFile(args) => execute_create(args, NewEntryKind::File, &paths),
        Commands::NewFolder(args) => execute_create(args, NewEntryKind::Folder, &paths),
        Commands::Trash(args) => execute_trash(args, &paths),
        Commands::CreatePack(args) => execute_create_pack(args, &paths),
        Commands::PackFormats => {
            execute_pack_formats();
            Ok(())
        }
        Commands::Assets(subcommand) => execute_assets_command(subcommand, &paths),
        Commands::Preferences(subcommand) => execute_preferences_command(subcommand, &paths),
    }
}

fn resolve_paths(data_dir: Option<PathBuf>, game_dir: Option<PathBuf>) -> Result<AppPaths> {
    let mut paths = match AppPaths::discover() {
        Some(paths) => paths,
        None => {
            let data = data_dir
                .clone()
                .ok_or_else(|| anyhow!("no platform data directory; pass --data-dir"))?;
            let game = game_dir
                .clone()
                .unwrap_or_else(|| data.join("minecraft"));
            AppPaths::new(data, game)
        }
    };
    if let Some(dir) = data_dir {
        paths = paths.with_data_dir(dir);
    }
    // An unreadable preferences file is reported by the commands that need it.
    let game_dir = game_dir.or_else(|| {
        load_preferences(&paths)
            .ok()
            .and_then(|store| store.preferences().game.game_dir.clone())
    });
    if let Some(dir) = game_dir {
        paths = paths.with_game_dir(dir);
    }
    Ok(paths)
}

fn execute_projects_command(command: ProjectsCommand, paths: &AppPaths) -> Result<()> {
    let store = ProjectStore::in_data_dir(paths.data_dir());
    match command {
        ProjectsCommand::List => {
            let projects = store.list();
            if projects.is_empty() {
                println!("No projects recorded.");
            }
            for summary in projects {
                println!(
                    "{}  {}  {}",
                    summary.hash,
                    summary.last_opened.format("%Y-%m-%d %H:%M:%S"),
                    summary.name
                );
            }
        }
        ProjectsCommand::Open { root } => {
            let project = store
                .open(&root)
                .with_context(|| format!("failed to open project {}", root.display()))?;
            println!(
                "Opened {} (pack format {}) as {}",
                project.name,
                project.pack_format,
                project.hash()
            );
        }
        ProjectsCommand::Show { hash } => {
            let hash = ProjectHash::parse(&hash)?;
            let project = store.load(&hash)?;
            let json = serde_json::to_string_pretty(&project.to_record())?;
            println!("{json}");
        }
    }
    Ok(())
}

fn execute_tree(args: TreeArgs, paths: &AppPaths) -> Result<()> {
    let mut workbench = open_workbench(&args.root, paths)?;
    for folder in &args.expand {
        // Expanding needs every ancestor listed first.
        let mut current = PathBuf::new();
        for component in folder.components() {
            current.push(component);
            workbench
                .dispatch(Command::Expand(current.clone()))
                .with_context(|| format!("cannot expand {}", current.display()))?;
        }
    }

    println!("{}", workbench.project().root().display());
    for row in workbench.tree().rows() {
        let indent = "  ".repeat(row.depth.saturating_sub(1));
        let suffix = if row.kind == EntryKind::Directory { "/" } else { "" };
        println!("{indent}{}{suffix}", row.name);
    }
    Ok(())
}

fn execute_menu(args: EntryArgs, paths: &AppPaths) -> Result<()> {
    let root = project_root(&args)?;
    let workbench = open_workbench(&root, paths)?;
    let menu = workbench.context_menu(&rpide_project::absolutize(&args.path)?)?;
    for category in menu.categories() {
        println!("[{}]", category.name());
        for entry in category.entries() {
            println!("  {}", entry.label);
        }
    }
    Ok(())
}

fn execute_tab(args: EntryArgs, paths: &AppPaths) -> Result<()> {
    let root = project_root(&args)?;
    let mut workbench = open_workbench(&root, paths)?;
    let target = rpide_project::absolutize(&args.path)?;
    let Outcome::TabOpened(id) = workbench.dispatch(Command::OpenFile(target))? else {
        bail!("{} did not open as a tab", args.path.display());
    };
    let tab = workbench
        .tabs()
        .get(id)
        .ok_or_else(|| anyhow!("tab {id} vanished"))?;
    let summary = tab.summary();
    println!("Title: {}", summary.title);
    println!("Path: {}", summary.path.display());
    if let Some(indentation) = summary.indentation {
        println!("Indentation: {indentation}");
    }
    if let Some(line_ending) = summary.line_ending {
        println!("Line ending: {line_ending}");
    }
    if let Some(text) = tab.as_text() {
        println!("Lines: {}", text.contents()?.lines().count());
    }
    Ok(())
}

fn execute_create(args: EntryArgs, kind: NewEntryKind, paths: &AppPaths) -> Result<()> {
    let target = rpide_project::absolutize(&args.path)?;
    let (Some(parent), Some(name)) = (target.parent(), target.file_name()) else {
        bail!("{} has no file name", args.path.display());
    };
    let parent = parent.to_path_buf();
    let name = name.to_string_lossy().into_owned();
    let root = project_root(&args)?;
    let mut workbench = open_workbench(&root, paths)?;

    match workbench.dispatch(Command::CreateEntry { parent, name, kind })? {
        Outcome::Notice(notice) => println!("Notice: {}", notice.message),
        Outcome::TreeStale => println!(
            "Created {} (the file tree could not be re-read)",
            args.path.display()
        ),
        _ => println!("Created {}", args.path.display()),
    }
    Ok(())
}

fn execute_trash(args: EntryArgs, paths: &AppPaths) -> Result<()> {
    let root = project_root(&args)?;
    let mut workbench = open_workbench(&root, paths)?;
    let target = rpide_project::absolutize(&args.path)?;
    workbench.dispatch(Command::DeleteEntry(target))?;
    println!("Moved {} to the trash", args.path.display());
    Ok(())
}

fn execute_create_pack(args: CreatePackArgs, paths: &AppPaths) -> Result<()> {
    let location = args
        .location
        .unwrap_or_else(|| paths.resourcepacks_dir());
    let pack_format = match args.pack_format {
        Some(number) => PackFormat::get(number)
            .ok_or_else(|| anyhow!("unknown pack format {number}; see `pack-formats`"))?
            .pack_format,
        None => PackFormat::latest().pack_format,
    };
    let root = create_pack(&location, &args.name, pack_format, &args.description)?;
    let project = ProjectStore::in_data_dir(paths.data_dir()).open(&root)?;
    println!(
        "Created {} at {} ({})",
        project.name,
        root.display(),
        project.hash()
    );
    Ok(())
}

fn execute_pack_formats() {
    for format in PACK_FORMATS.iter() {
        println!(
            "{}  {}  (assets {})",
            format.pack_format, format.versions, format.asset_version
        );
    }
}

fn execute_assets_command(command: AssetsCommand, paths: &AppPaths) -> Result<()> {
    match command {
        AssetsCommand::Extract { version, force } => {
            let assets = VanillaAssets::new(paths.vanilla_assets_dir(), version)?;
            if assets.exists_cached() && !force {
                println!(
                    "Vanilla assets for {} already cached at {}",
                    assets.version(),
                    assets.version_dir().display()
                );
                return Ok(());
            }

            let mut progress = Progress::new(
                format!("Extracting vanilla assets for {}", assets.version()),
                1,
            );
            let mut last_percent = None;
            progress.observe(move |snapshot| {
                let percent = (snapshot.fraction() * 100.0) as u32;
                if last_percent != Some(percent) {
                    last_percent = Some(percent);
                    eprint!("\r{}: {percent:>3}%", snapshot.name);
                }
            });
            let result = assets.extract(paths.game_dir(), &mut progress);
            eprintln!();
            result?;
            println!(
                "Extracted {} to {}",
                assets.version(),
                assets.version_dir().display()
            );
        }
        AssetsCommand::Path { version, resource } => {
            let assets = VanillaAssets::new(paths.vanilla_assets_dir(), version)?;
            println!("{}", assets.absolute_path(&resource)?.display());
        }
    }
    Ok(())
}

fn execute_preferences_command(command: PreferencesCommand, paths: &AppPaths) -> Result<()> {
    let mut store = load_preferences(paths)?;
    match command {
        PreferencesCommand::Show => {
            let json = serde_json::to_string_pretty(store.preferences())?;
            println!("{json}");
        }
        PreferencesCommand::Set(args) => {
            store.update(|prefs| {
                if let Some(size) = args.indent_size {
                    prefs.editor.indent_size = size;
                }
                if let Some(spaces) = args.insert_spaces {
                    prefs.editor.insert_spaces = spaces;
                }
                if let Some(theme) = args.theme {
                    prefs.ui.theme = theme.into();
                }
                if let Some(dir) = args.default_game_dir {
                    prefs.game.game_dir = Some(dir);
                }
            })?;
            println!(
                "Default indentation: {}",
                store.preferences().editor.default_indentation()
            );
        }
    }
    Ok(())
}

fn load_preferences(paths: &AppPaths) -> Result<PreferencesStore> {
    let file = paths.preferences_file();
    PreferencesStore::load(&file)
        .with_context(|| format!("failed to load preferences from {}", file.display()))
}

fn open_workbench(root: &Path, paths: &AppPaths) -> Result<Workbench<SystemShell>> {
    let project = Project::from_directory(root)
        .with_context(|| format!("failed to open project {}", root.display()))?;
    let indentation = load_preferences(paths)?
        .preferences()
        .editor
        .default_indentation();
    Ok(Workbench::new(project, indentation, SystemShell)?)
}

fn project_root(args: &EntryArgs) -> Result<PathBuf> {
    if let Some(root) = &args.project {
        return Ok(root.clone());
    }
    let target = rpide_project::absolutize(&args.path)?;
    target
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("{} has no parent folder; pass --project", target.display()))
}
