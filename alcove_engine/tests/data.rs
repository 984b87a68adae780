use alcove_engine as ae;
use ae::config::try_load_config;
use ae::loader::{load_content, load_context};
use ae::{Context, ItemDescriptor, Quantity, lint_content, render};
use std::fs;
use std::path::PathBuf;

fn bundled(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(file)
}

#[test]
fn test_lib_version() {
    assert!(!ae::ALCOVE_VERSION.is_empty());
}

#[test]
fn bundled_content_is_lint_clean() {
    let content = load_content(&bundled("content.ron")).expect("bundled content loads");
    let ctx = load_context(&bundled("context.toml")).expect("bundled context loads");
    let issues = lint_content(&content, Some(&ctx));
    assert!(issues.is_empty(), "{issues:#?}");
}

#[test]
fn bundled_config_points_at_bundled_files() {
    let config = try_load_config(&bundled("alcove.toml")).expect("bundled config parses");
    assert_eq!(config.content.path, bundled("content.ron"));
    assert_eq!(config.context.path, Some(bundled("context.toml")));
    assert_eq!(config.output.width, 80);
}

#[test]
fn bundled_descriptions_render() {
    let content = load_content(&bundled("content.ron")).expect("bundled content loads");
    let ctx = load_context(&bundled("context.toml")).expect("bundled context loads");

    let pants = content.description("pants").expect("pants exist");
    assert_eq!(
        render(&pants.text, &ctx).unwrap(),
        "It's a pair of long, purple pants with a checker pattern. There are four pockets altogether."
    );

    let lockbox = content.description("lockbox").expect("lockbox exists");
    assert_eq!(
        render(lockbox.template(false), &ctx).unwrap(),
        "A heavy LOCKBOX with a four-digit dial. The scratches around the 7 look recent."
    );
    assert_eq!(
        render(lockbox.template(true), &ctx).unwrap(),
        "The LOCKBOX hangs open. Inside is a KEY."
    );

    let lighter = content.description("lighter").expect("lighter exists");
    assert_eq!(
        render(&lighter.text, &ctx).unwrap(),
        "A cheap plastic LIGHTER. It has 3 uses left."
    );
}

#[test]
fn placements_drive_item_list_edits() {
    let content = load_content(&bundled("content.ron")).expect("bundled content loads");
    let placement = content
        .placements
        .iter()
        .find(|p| p.item == "gun")
        .expect("gun placement");
    let pants = content.description(&placement.container).expect("container exists");
    let gun: ItemDescriptor = content.item(&placement.item).expect("gun exists").descriptor(placement.quantity);

    let edited = ae::add_item(&pants.text, &gun, placement.list.as_deref()).unwrap();
    assert!(edited.contains(r#"<il name="RIGHT POCKET"><item>a GUN</item></il>"#));
    assert_eq!(
        render(&edited, &Context::new()).unwrap(),
        "It's a pair of long, purple pants with a checker pattern. There are four pockets altogether. In the right pocket, you find a GUN."
    );

    let emptied = ae::remove_item(&edited, &ItemDescriptor { quantity: Quantity::Count(0), ..gun }, placement.list.as_deref()).unwrap();
    assert_eq!(emptied, pants.text);
}

#[test]
fn config_and_context_from_temp_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("player.json"), r#"{"player": {"talent": "Iris"}}"#).expect("write context");
    fs::write(
        dir.path().join("alcove.toml"),
        "[context]\npath = \"player.json\"\n\n[output]\nwidth = 40\n",
    )
    .expect("write config");

    let config = try_load_config(&dir.path().join("alcove.toml")).expect("config parses");
    let ctx = load_context(config.context.path.as_deref().expect("context path set")).expect("context loads");
    let template = r#"<s>Flowers.</s> <if cond="player.talent == 'Iris'"><s>They whisper to you.</s></if>"#;
    assert_eq!(render(template, &ctx).unwrap(), "Flowers. They whisper to you.");
    assert_eq!(config.output.width, 40);
}
