use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;
use std::process::{Command, Output};

const WIKI: &str = "https://wiki.invalid";

fn erdtable(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_erdtable"))
        .args(args)
        .arg("--no-progress")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run erdtable")
}

fn cache_name(url: &str) -> String {
    let stem: String = url
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    format!("{stem}.html")
}

fn upgrade_table(infusion: &str, levels: usize) -> String {
    let mut html = String::from(
        "<table><tr><th>Name</th><th>Attack Power</th><th>Attack Power</th>\
         <th>Stat Scaling</th><th>Stat Scaling</th><th>Passive Effects</th>\
         <th>Damage Reduction (%)</th><th>Damage Reduction (%)</th></tr>\
         <tr><th>Name</th><th>Phy</th><th>Mag</th><th>Str</th><th>Dex</th><th>-</th><th>Phy</th><th>Bst</th></tr>",
    );
    for level in 0..levels {
        let label = if level == 0 {
            infusion.to_string()
        } else {
            format!("{infusion} +{level}")
        };
        let _ = write!(
            html,
            "<tr><th>{label}</th><td>{}</td><td>0</td><td>D</td><td>C</td>\
             <td><a href=\"/Hemorrhage\">Hemorrhage</a> (45)</td><td>50</td><td>32</td></tr>",
            110 + level
        );
    }
    html.push_str("</table>");
    html
}

fn weapon_page(name: &str, category: &str, tables: &str) -> String {
    format!(
        r#"<html><body>
<div id="breadcrumbs-container"><a href="/">Wiki</a><a href="/{category}">{category}</a></div>
<div id="infobox"><h2>{name}</h2><table><tbody>
<tr><td>img</td></tr>
<tr><td>Phy 110</td></tr>
<tr><td>Crit 100</td></tr>
<tr><td>Req</td><td><div class="lineleft">Str 11<br>Dex 13</div></td></tr>
<tr><td>Type</td><td>Slash / Pierce</td></tr>
<tr><td>Unsheathe</td></tr>
<tr><td>Wgt. 5.5</td></tr>
</tbody></table></div>
{tables}
</body></html>"#
    )
}

fn seed_cache(dir: &Path) {
    let index = r#"<table class="wiki_table"><tbody>
<tr><td><a href="/Uchigatana">Uchigatana</a></td></tr>
<tr><td><a href="/Moonveil">Moonveil</a></td></tr>
</tbody></table>"#;
    std::fs::write(
        dir.join(cache_name(&format!("{WIKI}/Weapons+Comparison+Tables"))),
        index,
    )
    .unwrap();

    let uchigatana = weapon_page(
        "Uchigatana",
        "Katanas",
        &format!("{}{}", upgrade_table("Standard", 26), upgrade_table("Keen", 26)),
    );
    std::fs::write(dir.join(cache_name(&format!("{WIKI}/Uchigatana"))), uchigatana).unwrap();

    let moonveil = weapon_page("Moonveil", "Katanas", &upgrade_table("Standard", 11));
    std::fs::write(dir.join(cache_name(&format!("{WIKI}/Moonveil"))), moonveil).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn scrape_map_flatten_from_cached_pages() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache");
    std::fs::create_dir_all(&cache).unwrap();
    seed_cache(&cache);

    let scraped = dir.path().join("scraped/weapons.json");
    let weapons = dir.path().join("output/weapons.json");
    let infused = dir.path().join("output/infusedWeapons.json");
    let csv = dir.path().join("output/infusedWeapons.csv");
    let html = dir.path().join("output/report.html");

    let output = erdtable(&[
        "scrape",
        "--wiki-url",
        WIKI,
        "--cache-dir",
        cache.to_str().unwrap(),
        "--output",
        scraped.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let raw = read_json(&scraped);
    assert_eq!(raw.as_array().unwrap().len(), 2);
    assert_eq!(raw[0]["name"], "Uchigatana");
    assert_eq!(raw[0]["critical"], "100");

    let output = erdtable(&[
        "map",
        "--input",
        scraped.to_str().unwrap(),
        "--output",
        weapons.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let normalized = read_json(&weapons);
    assert_eq!(normalized[0]["category"], "katana");
    assert_eq!(normalized[0]["upgradeType"], "standard");
    assert_eq!(normalized[0]["infusable"], true);
    assert_eq!(normalized[0]["requiredAttributes"]["strength"], 11.0);
    assert_eq!(normalized[0]["physicalDamageTypes"][1], "pierce");
    assert_eq!(normalized[1]["upgradeType"], "somber");
    assert_eq!(normalized[1]["infusable"], false);
    assert_eq!(normalized[1]["infusions"]["standard"][10]["effects"]["bleed"], 45.0);

    let output = erdtable(&[
        "flatten",
        "--input",
        weapons.to_str().unwrap(),
        "--output",
        infused.to_str().unwrap(),
        "--save-csv",
        csv.to_str().unwrap(),
        "--save-html",
        html.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let rows = read_json(&infused);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1]["infusion"], "keen");
    assert_eq!(rows[1]["level"], 25);
    assert_eq!(rows[1]["attack"]["physical"], 135.0);
    assert_eq!(rows[2]["level"], 10);
    assert!(csv.exists());
    assert!(std::fs::read_to_string(&html).unwrap().contains("Moonveil"));
}

#[test]
fn map_without_scraped_file_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.json");
    let output = erdtable(&["map", "--input", input.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("erdtable scrape"), "{stderr}");
}

#[test]
fn map_rejects_unknown_category() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("weapons.json");
    let output_path = dir.path().join("out.json");
    let raw = r#"[{
        "name": "Finger Seal",
        "category": "Spell Tools",
        "wikiUrl": "https://wiki.invalid/Finger+Seal",
        "physicalDamageTypes": [],
        "requiredAttributes": {"Fai": "10"},
        "weaponArt": "",
        "weight": "0.5",
        "critical": "",
        "infusions": {"standard": [{
            "guardBoost": "15",
            "castingScaling": null,
            "scaling": {"strength": "-", "dexterity": "-", "intelligence": "-", "faith": "D", "arcane": "-"},
            "attack": {"physical": "0", "magic": "0", "fire": "0", "lightning": "0", "holy": "0"},
            "guard": {"physical": "0", "magic": "0", "fire": "0", "lightning": "0", "holy": "0"}
        }]}
    }]"#;
    std::fs::write(&input, raw).unwrap();

    let output = erdtable(&[
        "map",
        "--input",
        input.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Finger Seal"));
    assert!(!output_path.exists());
}
