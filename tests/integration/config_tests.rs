use dupfind::config::{Config, ENV_PREFIX};
use dupfind::scanner::hasher::PartialSizeSpec;
use dupfind::scanner::{HashAlgorithm, PartialReadPolicy};
use figment::providers::Serialized;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::tempdir;

// Environment variables are process-wide; serialize the tests that set them.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "DUPFIND_OUTPUT_FILE",
        "DUPFIND_IO_THREADS",
        "DUPFIND_HASH_ALGORITHM",
        "DUPFIND_PARTIAL_SIZES__MKV",
        "DUPFIND_PARTIAL_SIZES__ISO",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = figment::Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.hash_algorithm, HashAlgorithm::Blake3_128);
    assert_eq!(config.max_recent_folders, 20);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("dupfind.toml");

    let toml_content = r#"
output_file = "custom_report.md"
hash_algorithm = "sha256"
io_threads = 8
follow_symlinks = true
max_recent_folders = 5
history_file = "/tmp/dupfind_history.json"

[partial_sizes]
iso = "1mb"
mkv = ["64kb", "32KB"]
bad = "lots"
bin = 100
img = [512, "1kb"]
"#;
    fs::write(&config_path, toml_content).unwrap();

    use figment::{
        providers::{Format, Toml},
        Figment,
    };
    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.output_file, PathBuf::from("custom_report.md"));
    assert_eq!(config.hash_algorithm, HashAlgorithm::Sha256);
    assert_eq!(config.io_threads, 8);
    assert!(config.follow_symlinks);
    assert_eq!(config.max_recent_folders, 5);
    assert_eq!(
        config.history_file,
        Some(PathBuf::from("/tmp/dupfind_history.json"))
    );
    assert_eq!(
        config.partial_sizes.get("mkv"),
        Some(&PartialSizeSpec::Pair("64kb".into(), "32KB".into()))
    );

    let sizes = config.partial_sizes();
    assert_eq!(
        sizes.policy_for(Path::new("a.ISO")),
        PartialReadPolicy::Chunked(1024 * 1024)
    );
    assert_eq!(
        sizes.policy_for(Path::new("b.mkv")),
        PartialReadPolicy::HeadTail {
            head: 65536,
            tail: 32768
        }
    );
    // Malformed sizes parse to zero instead of failing
    assert_eq!(
        sizes.policy_for(Path::new("c.bad")),
        PartialReadPolicy::Chunked(0)
    );
    // Bare integers are byte counts
    assert_eq!(
        sizes.policy_for(Path::new("e.bin")),
        PartialReadPolicy::Chunked(100)
    );
    assert_eq!(
        sizes.policy_for(Path::new("f.img")),
        PartialReadPolicy::HeadTail {
            head: 512,
            tail: 1024
        }
    );
    assert_eq!(
        sizes.policy_for(Path::new("d.txt")),
        PartialReadPolicy::Full
    );
}

#[test]
fn test_config_load_explicit_file() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(&config_path, "io_threads = 3\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert_eq!(config.io_threads, 3);
    assert_eq!(config.output_file, PathBuf::from("duplicate_files_report.md"));
}

#[test]
fn test_config_env_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(&config_path, "io_threads = 3\noutput_file = \"file.md\"\n").unwrap();

    std::env::set_var("DUPFIND_IO_THREADS", "16");
    std::env::set_var("DUPFIND_HASH_ALGORITHM", "blake3");
    std::env::set_var("DUPFIND_PARTIAL_SIZES__MKV", "2mb");
    std::env::set_var("DUPFIND_PARTIAL_SIZES__ISO", "100");

    let config = Config::load(Some(&config_path));
    clear_env();
    let config = config.unwrap();

    assert_eq!(ENV_PREFIX, "DUPFIND_");
    assert_eq!(config.io_threads, 16);
    assert_eq!(config.hash_algorithm, HashAlgorithm::Blake3);
    assert_eq!(config.output_file, PathBuf::from("file.md"));
    assert_eq!(
        config.partial_sizes().policy_for(Path::new("x.mkv")),
        PartialReadPolicy::Chunked(2 * 1024 * 1024)
    );
    // Numeric env values arrive as integers, not strings
    assert_eq!(
        config.partial_sizes().policy_for(Path::new("x.iso")),
        PartialReadPolicy::Chunked(100)
    );
}

#[test]
fn test_config_invalid_value_is_error() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "hash_algorithm = \"md5\"\n").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_config_invalid_toml_is_error() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "io_threads = [unclosed").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_config_missing_explicit_file_is_error() {
    let temp_dir = tempdir().unwrap();
    let result = Config::load(Some(&temp_dir.path().join("absent.toml")));
    assert!(result.is_err());
}
