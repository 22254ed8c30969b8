use std::{
    env, fs,
    path::{Path, PathBuf},
    process::Command,
};

fn run_bin(args: &[&str]) {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_alveus"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

fn setup_sim_dir(name: &str, config_contents: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    fs::write(&config_path, config_contents).expect("failed to write config file");

    test_dir
}

fn read_results(test_dir: &Path, run_idx: usize) -> serde_json::Value {
    let results_file = test_dir
        .join(format!("run-{run_idx:04}"))
        .join("results.json");
    let contents = fs::read_to_string(&results_file).expect("failed to read results file");
    serde_json::from_str(&contents).expect("failed to parse results file")
}

#[test]
fn basic_workflow() {
    let config_contents = String::new()
        + "[hive]\n"
        + "total_frames = 10\n"
        + "initial_brood_frames = 6\n"
        + "\n"
        + "[rates]\n"
        + "egg_laying = 1100\n"
        + "attrition = 300\n"
        + "\n"
        + "[schedule]\n"
        + "num_days = 60\n"
        + "frame_additions = [ { day = 3, frames = 1 },]\n"
        + "queen_loss_day = 20\n";
    let test_dir = setup_sim_dir("basic_workflow", &config_contents);

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--sim-dir", test_dir_str, "create"]);
    run_bin(&["--sim-dir", test_dir_str, "create"]);

    assert!(test_dir.join("run-0000").join("trajectory.msgpack").is_file());
    assert!(test_dir.join("run-0001").join("trajectory.msgpack").is_file());

    run_bin(&["--sim-dir", test_dir_str, "analyze"]);

    let results = read_results(&test_dir, 0);
    let results = results.as_array().expect("results are not an array");
    let events = results
        .iter()
        .find_map(|obs| obs.get("events"))
        .and_then(|events| events.as_array())
        .expect("missing events");
    let descriptions: Vec<_> = events
        .iter()
        .map(|event| event["description"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(
        descriptions,
        [
            "Added 1 frame(s), total brood frames: 7",
            "Queen lost, emergency queen rearing started",
            "Virgin queen emerged",
            "Queen mated and started laying eggs",
        ]
    );
    let honey = results
        .iter()
        .find_map(|obs| obs.get("honey"))
        .expect("missing honey");
    assert!(honey.is_null());

    run_bin(&["--sim-dir", test_dir_str, "clean"]);

    assert!(!test_dir.join("run-0000").exists());
    assert!(!test_dir.join("run-0001").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn seasonal_workflow() {
    let config_contents = String::new()
        + "[schedule]\n"
        + "num_days = 120\n"
        + "\n"
        + "[season]\n"
        + "location = \"baia-mare\"\n"
        + "start_month = 3\n"
        + "start_day = 1\n"
        + "\n"
        + "[weather]\n"
        + "seed = 7\n";
    let test_dir = setup_sim_dir("seasonal_workflow", &config_contents);

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--sim-dir", test_dir_str, "create"]);
    run_bin(&["--sim-dir", test_dir_str, "create"]);
    run_bin(&["--sim-dir", test_dir_str, "analyze"]);

    let results_0 = read_results(&test_dir, 0);
    let results_1 = read_results(&test_dir, 1);
    assert_eq!(results_0, results_1, "seeded runs differ");

    let honey = results_0
        .as_array()
        .expect("results are not an array")
        .iter()
        .find_map(|obs| obs.get("honey"))
        .expect("missing honey");
    let final_stores = honey["final_stores_kg"]
        .as_f64()
        .expect("missing final stores");
    assert!(final_stores >= 0.0);
    assert!(
        honey["flows"]
            .as_array()
            .is_some_and(|flows| !flows.is_empty())
    );

    run_bin(&["--sim-dir", test_dir_str, "clean"]);

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn rejects_invalid_config() {
    let test_dir = setup_sim_dir("rejects_invalid_config", "[schedule]\nnum_days = 0\n");

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    let output = Command::new(PathBuf::from(env!("CARGO_BIN_EXE_alveus")))
        .args(["--sim-dir", test_dir_str, "create"])
        .output()
        .expect("failed to execute command");
    assert!(!output.status.success());
    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}
