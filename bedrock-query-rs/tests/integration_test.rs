//! Integration tests for the bedrock-query CLI using fixture dumps.

use serde_json::Value;
use std::path::PathBuf;
use std::process::Command;

/// Get the path to a fixture file.
fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent()
        .unwrap()
        .join("fixtures")
        .join(name)
}

/// Run the CLI and return stdout, stderr and the exit code.
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let binary = env!("CARGO_BIN_EXE_bedrock-query");

    let output = Command::new(binary)
        .env("XDG_CONFIG_HOME", fixture_path("no-config"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute bedrock-query");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run `search` against the fixture world.
fn search(screen: &str, query: &str) -> (Value, i32) {
    let dump = fixture_path("world.jsonl");
    let (stdout, stderr, code) = run_cli(&[
        "search",
        "--dump",
        dump.to_str().unwrap(),
        "--screen",
        screen,
        query,
    ]);
    assert_eq!(code, 0, "search failed: {}", stderr);
    (serde_json::from_str(&stdout).unwrap(), code)
}

fn display_keys(response: &Value) -> Vec<String> {
    response["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["displayKey"].as_str().unwrap().to_string())
        .collect()
}

fn search_keys(screen: &str, query: &str) -> Vec<String> {
    display_keys(&search(screen, query).0)
}

mod search_command {
    use super::*;

    #[test]
    fn empty_query_returns_screen_records() {
        let (response, _) = search("maps", "");
        assert_eq!(response["total"], 2);
        assert_eq!(response["screen"], "maps");
        assert_eq!(display_keys(&response), vec!["map_-1", "map_5"]);
    }

    #[test]
    fn type_filter() {
        assert_eq!(search_keys("all", "type:Map"), vec!["map_-1", "map_5"]);
        assert_eq!(
            search_keys("all", "type:player type:PlayerClient -dbkey:local"),
            vec!["player_server_7f3a"]
        );
    }

    #[test]
    fn type_and_negated_type_partition() {
        let (all, _) = search("all", "");
        let (data3d, _) = search("all", "type:Data3D");
        let (rest, _) = search("all", "-type:Data3D");
        assert_eq!(display_keys(&data3d), vec!["1, 2, overworld, Data3D"]);
        assert_eq!(
            data3d["total"].as_u64().unwrap() + rest["total"].as_u64().unwrap(),
            all["total"].as_u64().unwrap()
        );
        assert!(!display_keys(&rest).contains(&"1, 2, overworld, Data3D".to_string()));
    }

    #[test]
    fn typeid_filter() {
        assert_eq!(
            search_keys("entities", "typeid:minecraft:zombie"),
            vec!["actorprefix1", "actorprefix3"]
        );
        assert_eq!(
            search_keys("entities", "-typeid:minecraft:zombie"),
            vec!["actorprefix2"]
        );
    }

    #[test]
    fn name_and_uuid_filters() {
        assert_eq!(search_keys("entities", "name:Bob"), vec!["actorprefix1"]);
        assert_eq!(
            search_keys("entities", "uuid:-4294967295"),
            vec!["actorprefix1"]
        );
        assert_eq!(search_keys("players", "name:Alex"), vec!["player_server_7f3a"]);
    }

    #[test]
    fn one_of_and_all_of() {
        assert_eq!(
            search_keys("entities", "^typeid:minecraft:zombie ^name:Bob"),
            vec!["actorprefix3"]
        );
        assert_eq!(
            search_keys("entities", "&typeid:minecraft:zombie &name:Bob"),
            vec!["actorprefix1"]
        );
    }

    #[test]
    fn nbt_json_literal() {
        assert_eq!(
            search_keys(
                "entities",
                r#"nbt:'{"key": "Count", "tagType": "byte", "value": 1}'"#
            ),
            vec!["actorprefix1"]
        );
    }

    #[test]
    fn nbt_shorthand_literal() {
        assert_eq!(
            search_keys("entities", "nbt:short:Health=10"),
            vec!["actorprefix2"]
        );
        assert_eq!(
            search_keys("ticks", "nbt:tickList/0/blockState/name=minecraft:water"),
            vec!["1, 2, nether, PendingTicks"]
        );
        assert_eq!(
            search_keys("all", "nbt:block_name=minecraft:bedrock"),
            vec!["game_flatworldlayers"]
        );
    }

    #[test]
    fn free_text_searches_dumped_contents() {
        assert_eq!(search_keys("all", "iron_helmet"), vec!["actorprefix1"]);
        assert_eq!(search_keys("all", "IRON_HELMET"), vec!["actorprefix1"]);
    }

    #[test]
    fn custom_fields() {
        assert_eq!(search_keys("maps", "mapid:5"), vec!["map_5"]);
        assert_eq!(
            search_keys("ticks", r#"chunk:"1, 2""#),
            vec!["1, 2, nether, PendingTicks"]
        );
    }

    #[test]
    fn corrupt_payload_does_not_abort() {
        let keys = search_keys("all", "-nbt:x=1 type:BiomeData");
        assert_eq!(keys, vec!["BiomeData"]);
        assert!(search_keys("all", "nbt:x=1 type:BiomeData").is_empty());
    }

    #[test]
    fn deeply_nested_payload_is_skipped() {
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;
        use std::io::Write;

        // Chunk (0, 0) Entity record: an unnamed list root nested 200k levels deep.
        let mut key = Vec::new();
        key.extend_from_slice(&0i32.to_le_bytes());
        key.extend_from_slice(&0i32.to_le_bytes());
        key.push(0x32);
        let mut value = vec![9u8, 0, 0];
        for _ in 0..200_000 {
            value.push(9);
            value.extend_from_slice(&1i32.to_le_bytes());
        }
        value.push(0);
        value.extend_from_slice(&0i32.to_le_bytes());

        let mut dump = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            dump,
            r#"{{"key": "{}", "value": "{}"}}"#,
            STANDARD.encode(&key),
            STANDARD.encode(&value)
        )
        .unwrap();

        let path = dump.path().to_str().unwrap();
        let (stdout, stderr, code) = run_cli(&["-q", "search", "--dump", path, "nbt:x=1"]);
        assert_eq!(code, 0, "{}", stderr);
        let response: Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(response["total"], 0);

        let (stdout, _, code) = run_cli(&["-q", "search", "--dump", path, "-nbt:x=1"]);
        assert_eq!(code, 0);
        let response: Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(response["total"], 1);
    }

    #[test]
    fn limit_keeps_total() {
        let dump = fixture_path("world.jsonl");
        let (stdout, _, code) = run_cli(&[
            "search",
            "--dump",
            dump.to_str().unwrap(),
            "--limit",
            "1",
            "type:Map",
        ]);
        assert_eq!(code, 0);
        let response: Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(response["total"], 2);
        assert_eq!(display_keys(&response), vec!["map_-1"]);
    }

    #[test]
    fn yaml_output() {
        let dump = fixture_path("world.jsonl");
        let (stdout, _, code) = run_cli(&[
            "--yaml",
            "search",
            "--dump",
            dump.to_str().unwrap(),
            "type:Map",
        ]);
        assert_eq!(code, 0);
        assert!(stdout.contains("total: 2"));
        assert!(stdout.contains("contentType: Map"));
    }
}

mod search_errors {
    use super::*;

    fn search_err(query: &str) -> (String, i32) {
        let dump = fixture_path("world.jsonl");
        let (_, stderr, code) = run_cli(&["search", "--dump", dump.to_str().unwrap(), query]);
        (stderr, code)
    }

    #[test]
    fn unknown_content_type_suggests() {
        let (stderr, code) = search_err("type:Dat3D");
        assert_eq!(code, 2);
        assert!(stderr.contains("Did you mean \"Data3D\"?"));
    }

    #[test]
    fn unknown_keyword() {
        let (stderr, code) = search_err("foo:bar");
        assert_eq!(code, 2);
        assert!(stderr.contains("Unknown search filter 'foo'"));
    }

    #[test]
    fn unsupported_operator() {
        let (stderr, code) = search_err("^type:Map");
        assert_eq!(code, 2);
        assert!(stderr.contains("not supported"));
    }

    #[test]
    fn invalid_nbt_literal() {
        let (stderr, code) = search_err("nbt:{bad");
        assert_eq!(code, 2);
        assert!(stderr.contains("Invalid NBT query"));
    }

    #[test]
    fn missing_dump() {
        let (_, stderr, code) = run_cli(&["search", "--dump", "/nonexistent/world.jsonl", ""]);
        assert_eq!(code, 3);
        assert!(stderr.contains("not found"));
    }

    #[test]
    fn unknown_screen() {
        let dump = fixture_path("world.jsonl");
        let (_, _, code) = run_cli(&[
            "search",
            "--dump",
            dump.to_str().unwrap(),
            "--screen",
            "nope",
            "",
        ]);
        assert_eq!(code, 2);
    }

    #[test]
    fn fail_on_empty() {
        let dump = fixture_path("world.jsonl");
        let (stdout, _, code) = run_cli(&[
            "search",
            "--dump",
            dump.to_str().unwrap(),
            "--fail-on-empty",
            "dbkey:nothing-here",
        ]);
        assert_eq!(code, 4);
        assert!(stdout.contains("\"total\": 0"));
    }

    #[test]
    fn quiet_suppresses_errors() {
        let (_, stderr, code) = run_cli(&["-q", "search", "--dump", "/nonexistent", ""]);
        assert_eq!(code, 3);
        assert!(stderr.is_empty());
    }
}

mod config_file {
    use super::*;

    #[test]
    fn extra_screen_from_config() {
        let config = fixture_path("chunks.toml");
        let dump = fixture_path("world.jsonl");
        let (stdout, stderr, code) = run_cli(&[
            "--config",
            config.to_str().unwrap(),
            "search",
            "--dump",
            dump.to_str().unwrap(),
            "rawvalue:(",
        ]);
        assert_eq!(code, 0, "{}", stderr);
        let response: Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(response["screen"], "chunks");
        assert_eq!(display_keys(&response), vec!["1, 2, overworld, Version"]);
    }

    #[test]
    fn config_restricts_operators() {
        let config = fixture_path("chunks.toml");
        let dump = fixture_path("world.jsonl");
        let (_, _, code) = run_cli(&[
            "--config",
            config.to_str().unwrap(),
            "search",
            "--dump",
            dump.to_str().unwrap(),
            "&rawvalue:(",
        ]);
        assert_eq!(code, 2);
    }

    #[test]
    fn missing_config_file() {
        let (_, stderr, code) = run_cli(&["--config", "/nonexistent/config.toml", "screens"]);
        assert_eq!(code, 1);
        assert!(stderr.contains("Config file not found"));
    }
}

mod inspect_commands {
    use super::*;

    #[test]
    fn parse_command() {
        let (stdout, _, code) = run_cli(&["parse", r#"-typeid:cow "iron golem""#]);
        assert_eq!(code, 0);
        let response: Value = serde_json::from_str(&stdout).unwrap();
        let condition = &response["parsed"]["conditions"][0];
        assert_eq!(condition["keyword"], "typeid");
        assert_eq!(condition["negated"], true);
        assert_eq!(condition["value"], "cow");
        assert_eq!(response["parsed"]["freeText"][0]["text"], "iron golem");
    }

    #[test]
    fn explain_command() {
        let (stdout, _, code) = run_cli(&["explain", "--screen", "entities", "typeid:minecraft:cow"]);
        assert_eq!(code, 0);
        let response: Value = serde_json::from_str(&stdout).unwrap();
        let any_of = &response["compiled"]["nbtTags"]["anyOf"][0];
        assert_eq!(any_of["path"][0], "identifier");
        assert_eq!(any_of["value"], "minecraft:cow");
    }

    #[test]
    fn screens_command() {
        let (stdout, _, code) = run_cli(&["screens"]);
        assert_eq!(code, 0);
        let response: Value = serde_json::from_str(&stdout).unwrap();
        let names: Vec<&str> = response["screens"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["all", "players", "entities", "maps", "ticks"]);
    }

    #[test]
    fn classify_command() {
        let (stdout, _, code) = run_cli(&["classify", "bWFwXzU="]);
        assert_eq!(code, 0);
        let response: Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(response["contentType"], "Map");
        assert_eq!(response["displayKey"], "map_5");
    }

    #[test]
    fn classify_invalid_base64() {
        let (_, _, code) = run_cli(&["classify", "not base64!"]);
        assert_eq!(code, 1);
    }
}
