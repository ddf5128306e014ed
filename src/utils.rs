/*!
 * Utility functions and constant tables for codemerge
 */

use std::path::Path;

use chrono::{DateTime, Local};

/// Directory names that are never descended into, whatever the patterns say
pub const HARD_PRUNED_DIRS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// Built-in exclude patterns
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    // Git
    ".git",
    ".git/*",
    "**/.git",
    "**/.git/**",
    // Version Control
    ".svn",
    ".hg",
    ".gitignore",
    ".gitattributes",
    // Dependencies
    "node_modules",
    "node_modules/**",
    "vendor",
    "bower_components",
    "jspm_packages",
    // Build Outputs
    "build",
    "dist",
    "out",
    "target",
    ".next/**",
    "out/**",
    // Compiled Files
    "*.pyc",
    "*.pyo",
    "*.mo",
    "*.class",
    "*.dll",
    "*.exe",
    "*.o",
    "*.obj",
    "*.so",
    "*.dylib",
    "*.ncb",
    "*.sdf",
    "*.suo",
    "*.pdb",
    "*.idb",
    ".com",
    "*.bundle.js",
    "*.chunk.js",
    // Logs & Databases
    "*.log",
    "*.sql",
    "*.sqlite",
    "*.sqlite3",
    "*.sqlite3-journal",
    // OS Files
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    "._*",
    ".Spotlight-V100",
    ".Trashes",
    "ehthumbs.db",
    "ehthumbs_vista.db",
    // Lockfiles
    "package-lock.json",
    "yarn.lock",
    "composer.lock",
    "Gemfile.lock",
    // Caches & Temp
    ".cache",
    ".tmp",
    ".temp",
    ".sass-cache",
    "__pycache__",
    "*.py[cod]",
    ".eslintcache",
    ".stylelintcache",
    ".phpunit.result.cache",
    // IDEs & Editors
    ".vscode",
    ".idea",
    "*.swp",
    "*.swo",
    "*.sublime-*",
    "*.code-workspace",
    ".project",
    ".classpath",
    ".settings/",
    "*.launch",
    ".history/",
    // Test & Coverage
    "coverage",
    ".nyc_output",
    ".pytest_cache",
    ".tox",
    ".nox",
    "nosetests.xml",
    "coverage.xml",
    // Documentation
    "docs",
    "*.md",
    "*.rst",
    "*.txt",
    // Media & Archives
    "*.jpg",
    "*.jpeg",
    "*.png",
    "*.gif",
    "*.ico",
    "*.mov",
    "*.mp4",
    "*.mp3",
    "*.flv",
    "*.fla",
    "*.zip",
    "*.tar.gz",
    "*.rar",
    // Environment & Secrets
    ".env",
    ".env.*",
    "config.json",
    "settings.json",
    // Next.js & React
    ".vercel",
    "next-env.d.ts",
    ".eslintrc*",
    "next.config.js",
    "next-sitemap.config.js",
    "public/**",
    ".pnp.*",
    "*.pnp.js",
    // iOS & macOS
    "*.xcodeproj",
    "*.xcworkspace",
    "*.pbxproj",
    "*.mode1v3",
    "*.mode2v3",
    "*.perspectivev3",
    "*.xcuserstate",
    "*.xccheckout",
    "*.moved-aside",
    "*.hmap",
    "*.ipa",
    "*.dSYM.zip",
    "*.dSYM",
    "timeline.xctimeline",
    "playground.xcworkspace",
    ".build/",
    "DerivedData/",
    "*.playgroundbook",
    "Pods/",
    "Carthage/Build",
    // Android
    "*.iml",
    ".gradle",
    "local.properties",
    ".idea/caches",
    ".idea/libraries",
    ".idea/modules.xml",
    ".idea/workspace.xml",
    ".idea/navEditor.xml",
    ".idea/assetWizardSettings.xml",
    ".externalNativeBuild",
    ".cxx",
    "*.apk",
    "*.aab",
    "*.ap_",
    "*.dex",
    // Ruby on Rails
    "*.rbc",
    "capybara-*.html",
    ".rspec",
    "public/system",
    "spec/tmp",
    "**.orig",
    "rerun.txt",
    "pickle-email-*.html",
    ".bundle",
    "vendor/bundle",
    "log/*",
    "tmp/*",
    "storage/*",
    ".byebug_history",
    "config/master.key",
    "config/credentials.yml.enc",
    // Java
    "*.war",
    "*.ear",
    "*.jar",
    "hs_err_pid*",
    ".mtj.tmp/",
    // Python
    "*.egg-info/",
    "pip-log.txt",
    "pip-delete-this-directory.txt",
    ".tox/",
    ".coverage",
    ".coverage.*",
    "*.cover",
    "*.py,cover",
    ".hypothesis/",
    "pytestdebug.log",
    ".python-version",
    ".mypy_cache",
    ".dmypy.json",
    ".pyre/",
    // Go
    "*.test",
    "*.prof",
    "*.out",
    // Rust
    "target/",
    "Cargo.lock",
    "**/*.rs.bk",
    // .NET
    "[Bb]in/",
    "[Oo]bj/",
    "[Ll]og/",
    "[Ll]ogs/",
    ".vs/",
    "*_i.c",
    "*_p.c",
    "*_h.h",
    "*.ilk",
    "*.meta",
    "*.iobj",
    "*.pch",
    "*.ipdb",
    "*.pgc",
    "*.pgd",
    "*.rsp",
    "*.sbr",
    "*.tlb",
    "*.tli",
    "*.tlh",
    "*.tmp",
    "*.tmp_proj",
    "*_wpftmp.csproj",
    "*.vspscc",
    "*.vssscc",
    // Unity
    "[Ll]ibrary/",
    "[Tt]emp/",
    "[Bb]uild/",
    "[Bb]uilds/",
    "[Uu]ser[Ss]ettings/",
    "*.pidb.meta",
    "*.pdb.meta",
    "*.mdb.meta",
    "*.unitypackage",
    "crashlytics-build.properties",
    // Jupyter
    ".ipynb_checkpoints",
    "*/.ipynb_checkpoints/*",
    "*.ipynb",
    // R
    ".Rhistory",
    ".Rapp.history",
    ".RData",
    ".Ruserdata",
    "*-Ex.R",
    "/*.tar.gz",
    "/*.Rcheck/",
    ".Rproj.user/",
    "*.Rproj",
    // Elm
    "elm-stuff/",
    "*.elmo",
    "*.elmi",
    // Misc tooling
    ".ropeproject",
    ".spyderproject",
    ".spyproject",
    ".webassets-cache",
    ".scrapy",
    "celerybeat-schedule",
    "celerybeat.pid",
    "*.sage.py",
    ".venv",
    "env/",
    "venv/",
    "ENV/",
    ".tern-port",
    ".vscode-test",
    ".yarn-integrity",
    ".expo/",
    ".expo-shared/",
    "*.jks",
    "*.keystore",
    "*.mobileprovision",
    "*.provisionprofile",
    ".sonar",
    ".scannerwork",
    ".terraform",
    "*.tfstate",
    "*.tfstate.*",
    ".vagrant",
    "*.bak",
    "*.gho",
    "*.ori",
    "*.orig",
    ".Trash-*",
    "$RECYCLE.BIN/",
    "System Volume Information",
    "*.lnk",
    ".fseventsd",
    ".apdisk",
    "*.patch",
    "*.diff",
    "*.kicad_pcb-bak",
    "*.sch-bak",
    "~$*.doc*",
    "~$*.xls*",
    "~$*.ppt*",
    "*.~vsd*",
    ".~lock.*#",
    "Thumbs.db:encryptable",
    "*.stackdump",
    "[Dd]esktop.ini",
    "*.code-snippets",
    ".atom/",
    ".tags",
    ".tags_sorted_by_file",
    ".gemtags",
    "tags",
    "TAGS",
    "cscope.*",
    "*.rsuser",
    "*.pid",
    "*.seed",
    "*.pid.lock",
];

/// Size of `bytes` in KB as used by the size ceiling
pub fn size_in_kb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

/// Fence label for a file: its extension without the dot, or empty
pub fn language_tag(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Default artifact name: `<project>_<YYYYMMDD_HHMMSS>.md`
pub fn default_output_name(project_dir: &Path, now: DateTime<Local>) -> String {
    let project = project_dir
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .or_else(|| {
            project_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
        })
        .unwrap_or_else(|| "project".to_string());

    format!("{}_{}.md", project, now.format("%Y%m%d_%H%M%S"))
}
