// Unit tests for the reporter

use super::*;
use pretty_assertions::assert_eq;

fn sample() -> Listing {
    Listing {
        name: Some("Casa do Norte Sertão".into()),
        address: Some("R. Augusta, 100 - São Paulo".into()),
        phone: None,
        website: Some("https://sertao.example".into()),
        description: Some("Mercearia".into()),
    }
}

#[test]
fn test_simple_block_layout() {
    let mut reporter = Reporter::new(Vec::new(), OutputFormat::Simple);
    reporter
        .begin_query(&SearchQuery::new("casa do norte", Some("São Paulo".into())))
        .unwrap();
    reporter.report(&sample()).unwrap();
    reporter.finish().unwrap();

    let out = String::from_utf8(reporter.into_inner()).unwrap();
    let expected = format!(
        "Searching for: casa do norte in São Paulo\n\
         Name: Casa do Norte Sertão\n\
         Address: R. Augusta, 100 - São Paulo\n\
         Phone: Not available\n\
         Site: https://sertao.example\n\
         Description: Mercearia\n\
         {}\n\
         Total stores found: 1\n",
        "-".repeat(50)
    );
    assert_eq!(out, expected);
}

#[test]
fn test_json_lines_carry_query_and_nulls() {
    let mut reporter = Reporter::new(Vec::new(), OutputFormat::Json);
    reporter
        .begin_query(&SearchQuery::new("empório", None))
        .unwrap();
    reporter.report(&sample()).unwrap();
    reporter.report(&Listing::default()).unwrap();
    reporter.finish().unwrap();
    assert_eq!(reporter.count(), 2);

    let out = String::from_utf8(reporter.into_inner()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["query"], "empório");
    assert_eq!(first["name"], "Casa do Norte Sertão");
    assert!(first["phone"].is_null());
    assert_eq!(first["site"], "https://sertao.example");

    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert!(second["name"].is_null());
}

#[test]
fn test_empty_run_reports_zero() {
    let mut reporter = Reporter::new(Vec::new(), OutputFormat::Simple);
    reporter.finish().unwrap();
    let out = String::from_utf8(reporter.into_inner()).unwrap();
    assert_eq!(out, "Total stores found: 0\n");
}
