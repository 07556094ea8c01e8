//! Integration tests over on-disk configuration file sets.

use ngxconf::{CommentPosition, Config, Error};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }

    fs::write(path, content).unwrap();
}

/// A server root with a main config including two site files.
fn site_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write_file(
        root,
        "nginx.conf",
        concat!(
            "user nginx;\n",
            "http {\n",
            "    include sites-enabled/*.conf;\n",
            "}\n",
        ),
    );
    write_file(
        root,
        "sites-enabled/a.conf",
        concat!(
            "server {\n",
            "    server_name a.example.com;\n",
            "    listen 80;\n",
            "}\n",
        ),
    );
    write_file(
        root,
        "sites-enabled/b.conf",
        concat!(
            "server {\n",
            "    server_name b.example.com;\n",
            "}\n",
        ),
    );
    write_file(root, "sites-enabled/notes.txt", "not a config\n");

    dir
}

#[test]
fn test_load_missing_root_file() {
    let dir = TempDir::new().unwrap();

    let error = Config::load(dir.path(), None, false).unwrap_err();
    assert!(matches!(error, Error::MissingFile(_)));
}

#[test]
fn test_load_expands_matching_includes_only() {
    let dir = site_fixture();

    let config = Config::load(dir.path(), None, false).unwrap();

    let paths: Vec<_> = config.file_paths().collect();
    assert_eq!(paths.len(), 3);
    assert!(paths.iter().all(|p| p.extension().unwrap() == "conf"));
}

#[test]
fn test_find_across_included_files_in_order() {
    let dir = site_fixture();

    let config = Config::load(dir.path(), None, false).unwrap();

    let servers = config.find_blocks("server");
    assert_eq!(servers.len(), 2);

    let names = config.find_directives("server_name");
    assert_eq!(names.len(), 2);
    assert_eq!(names[0].first_value(), Some("a.example.com"));
    assert_eq!(names[1].first_value(), Some("b.example.com"));
}

#[test]
fn test_missing_include_target() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "nginx.conf", "include missing.conf;\n");

    let error = Config::load(dir.path(), None, false).unwrap_err();
    assert!(matches!(error, Error::MissingFile(_)));

    let config = Config::load(dir.path(), None, true).unwrap();
    assert_eq!(config.file_paths().count(), 1);
}

#[test]
fn test_syntax_error_aborts_load() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "nginx.conf", "include broken.conf;\n");
    write_file(dir.path(), "broken.conf", "server {\n    listen 80;\n");

    let error = Config::load(dir.path(), None, false).unwrap_err();
    assert!(matches!(error, Error::Syntax { .. }));
}

#[test]
fn test_explicit_config_file_path() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "conf/custom.conf", "user nginx;\n");

    let config =
        Config::load(dir.path(), Some(Path::new("conf/custom.conf")), false).unwrap();

    assert_eq!(config.find_directives("user").len(), 1);
}

#[test]
fn test_unmodified_dump_reproduces_bytes() {
    let dir = site_fixture();

    let config = Config::load(dir.path(), None, false).unwrap();
    config.dump().unwrap();

    let a = fs::read_to_string(dir.path().join("sites-enabled/a.conf")).unwrap();
    assert_eq!(
        a,
        "server {\n    server_name a.example.com;\n    listen 80;\n}\n"
    );

    let main = fs::read_to_string(dir.path().join("nginx.conf")).unwrap();
    assert!(main.starts_with("user nginx;\n"));
}

#[test]
fn test_comment_attachment_scenario() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "nginx.conf",
        concat!(
            "# block comment\n",
            "http { # inline\n",
            "    server {\n",
            "        server_name example.com www.example.com;\n",
            "        listen 80;\n",
            "    }\n",
            "}\n",
        ),
    );

    let config = Config::load(dir.path(), None, false).unwrap();

    let https = config.find_blocks("http");
    let comments: Vec<_> = https[0]
        .comments()
        .iter()
        .map(|c| c.content.as_str())
        .collect();
    assert_eq!(comments, vec!["block comment", "inline"]);
    assert_eq!(https[0].comments()[0].position, CommentPosition::Before);
    assert_eq!(https[0].comments()[1].position, CommentPosition::Inline);

    let servers = config.find_blocks("server");
    let names = servers[0].find_directives(&config, "server_name");
    assert_eq!(names[0].values(), ["example.com", "www.example.com"]);
}

#[test]
fn test_add_delete_symmetry() {
    let dir = site_fixture();
    let mut config = Config::load(dir.path(), None, false).unwrap();

    let file = config.get_config_file("nginx.conf").unwrap();
    file.add_directive(&mut config, "test", vec!["v".to_string()], true)
        .unwrap();

    let found = file.find_directives(&config, "test");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].values(), ["v"]);

    file.delete_directives_by_name(&mut config, "test");
    assert!(file.find_directives(&config, "test").is_empty());
}

#[test]
fn test_delete_removes_orphaned_comments() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "nginx.conf",
        concat!(
            "# keep this\n",
            "user nginx;\n",
            "# first\n",
            "# second\n",
            "listen 80; # inline\n",
        ),
    );

    let mut config = Config::load(dir.path(), None, false).unwrap();
    let file = config.get_config_file("nginx.conf").unwrap();

    file.delete_directives_by_name(&mut config, "listen");
    file.dump(&config).unwrap();

    let content = fs::read_to_string(dir.path().join("nginx.conf")).unwrap();
    assert!(!content.contains("first"));
    assert!(!content.contains("second"));
    assert!(!content.contains("inline"));
    assert!(content.contains("# keep this\nuser nginx;\n"));
}

#[test]
fn test_set_values_dump_reload() {
    let dir = site_fixture();
    let mut config = Config::load(dir.path(), None, false).unwrap();

    let mut name = config.find_directives("server_name").remove(0);
    name.set_values(
        &mut config,
        vec!["a.example.org".to_string(), "www.a.example.org".to_string()],
    );
    config.dump().unwrap();

    let reloaded = Config::load(dir.path(), None, false).unwrap();
    let names = reloaded.find_directives("server_name");
    assert_eq!(names[0].values(), ["a.example.org", "www.a.example.org"]);
    assert_eq!(names[1].first_value(), Some("b.example.com"));
}

#[test]
fn test_set_comments_round_trip() {
    let dir = site_fixture();
    let mut config = Config::load(dir.path(), None, false).unwrap();

    let listen = config.find_directives("listen").remove(0);
    listen.set_comments(
        &mut config,
        vec!["managed by ngxconf".to_string(), "do not edit".to_string()],
    );
    config.dump().unwrap();

    let reloaded = Config::load(dir.path(), None, false).unwrap();
    let listen = reloaded.find_directives("listen").remove(0);
    let comments: Vec<_> = listen
        .comments()
        .iter()
        .map(|c| c.content.as_str())
        .collect();
    assert_eq!(comments, vec!["managed by ngxconf", "do not edit"]);
}

#[test]
fn test_add_config_file_and_build_tree() {
    let dir = site_fixture();
    let mut config = Config::load(dir.path(), None, false).unwrap();

    let site = config.add_config_file(dir.path().join("sites-enabled/c.conf"));
    let http = site.add_http_block(&mut config).unwrap();
    let server = http.add_server_block(&mut config).unwrap();
    server.add_directive(&mut config, "listen", vec!["8080".to_string()], false);
    server.add_directive(
        &mut config,
        "server_name",
        vec!["c.example.com".to_string()],
        false,
    );

    site.dump(&config).unwrap();

    let content = fs::read_to_string(dir.path().join("sites-enabled/c.conf")).unwrap();
    assert!(content.contains("listen 8080;"));

    let reloaded = Config::load(dir.path(), None, false).unwrap();
    let matched = reloaded.find_server_blocks_by_server_name("c.example.com");
    assert_eq!(matched.len(), 1);
}

#[test]
fn test_parse_file_picks_up_external_change() {
    let dir = site_fixture();
    let mut config = Config::load(dir.path(), None, false).unwrap();

    write_file(
        dir.path(),
        "sites-enabled/b.conf",
        "server {\n    server_name b2.example.com;\n}\n",
    );

    config
        .parse_file(dir.path().join("sites-enabled/b.conf"))
        .unwrap();

    let names = config.find_directives("server_name");
    assert_eq!(names[1].first_value(), Some("b2.example.com"));
}

#[test]
fn test_upstream_editing_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "nginx.conf",
        concat!(
            "http {\n",
            "    upstream backend {\n",
            "        server 127.0.0.1:8080;\n",
            "    }\n",
            "}\n",
        ),
    );

    let mut config = Config::load(dir.path(), None, false).unwrap();

    let upstream = config.find_upstream_blocks_by_name("backend").remove(0);
    upstream
        .add_server(&mut config, "127.0.0.2:8080", vec!["backup".to_string()])
        .unwrap();
    config.dump().unwrap();

    let reloaded = Config::load(dir.path(), None, false).unwrap();
    let upstream = reloaded.find_upstream_blocks_by_name("backend").remove(0);
    let servers = upstream.servers(&reloaded);
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[1].address(), Some("127.0.0.2:8080"));
    assert_eq!(servers[1].flags(), ["backup".to_string()]);
}
