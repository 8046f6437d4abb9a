use std::fs;
use std::path::{Path, PathBuf};

use super::load::parse_html_nodes;
use super::scan_detect::assess_pages;
use super::write::FragmentWriter;
use super::*;
use crate::chapters::Language;
use crate::commands::status::latest_split_manifest;
use crate::model::{ChapterLabel, ContentNode, NodeKind};

const REPORT_HTML: &str = r#"<html><body>
<p>年度报告</p>
<p>目录</p>
<p>第一部分 导言 1</p>
<p>第二部分 方法 5</p>
<p style="color:red">第一部分 导言</p>
<p>这是导言正文。</p>
<img src="a.png">
<p>第二部分 方法</p>
<table><tr><td>数据</td></tr></table>
<p>方法正文内容。</p>
</body></html>"#;

const PLAIN_HTML: &str = "<html><body><p>普通文档</p><p>正文</p></body></html>";

fn split_args(input_dir: &Path, out_dir: &Path) -> SplitArgs {
    SplitArgs {
        input_dir: input_dir.to_path_buf(),
        out_dir: out_dir.to_path_buf(),
        chapter_num: 1,
        language: Language::Ideograph,
        chapters: None,
        output: OutputMode::Combine,
        profile: None,
        min_text_chars: 20,
        split_manifest_path: None,
    }
}

fn input_dir_with(root: &Path, files: &[(&str, &str)]) -> PathBuf {
    let input_dir = root.join("in");
    fs::create_dir_all(&input_dir).expect("create input dir");
    for (name, contents) in files {
        fs::write(input_dir.join(name), contents).expect("write input file");
    }
    input_dir
}

fn latest_manifest(out_dir: &Path) -> SplitRunManifest {
    let path = latest_split_manifest(&out_dir.join("manifests"))
        .expect("manifest dir readable")
        .expect("manifest written");
    read_json(&path).expect("manifest parses")
}

#[test]
fn parse_html_nodes_keeps_paragraphs_tables_and_images_in_order() {
    let nodes = parse_html_nodes(REPORT_HTML).expect("parses");

    assert_eq!(nodes.len(), 10);
    assert_eq!(nodes[1].raw_text, "目录");
    assert_eq!(nodes[4].style.as_deref(), Some("color:red"));
    assert_eq!(nodes[6].kind, NodeKind::Image);
    assert!(nodes[6].raw_text.is_empty());
    assert_eq!(
        nodes[6].attributes,
        vec![("src".to_string(), "a.png".to_string())]
    );
    assert_eq!(nodes[8].kind, NodeKind::Table);
    assert_eq!(nodes[8].raw_text, "数据");
    assert!(nodes.iter().enumerate().all(|(index, node)| node.ordinal == index));
}

#[test]
fn assess_pages_flags_scanned_documents() {
    let text = "a".repeat(50);

    let searchable = assess_pages(&[String::new(), text.clone(), text.clone()], 20);
    assert_eq!(searchable.image_like_pages, 0);
    assert!(searchable.searchable);

    let scanned = assess_pages(
        &["\u{E000}".repeat(30), text.clone(), String::new(), "12".to_string()],
        20,
    );
    assert_eq!(scanned.image_like_pages, 3);
    assert!(!scanned.searchable);

    assert!(!assess_pages(&[], 20).searchable);
    assert!(!assess_pages(&["abc".to_string()], 20).searchable);
}

#[test]
fn render_node_strips_style_only_from_fragments() {
    let writer = FragmentWriter::new().expect("writer");
    let mut node = ContentNode::new(0, NodeKind::Paragraph, "导言");
    node.attributes = vec![("class".to_string(), "x".to_string())];
    node.style = Some("color:red".to_string());
    node.chapter = Some(ChapterLabel::Title("导言".to_string()));
    node.inner_html = r#"<line style="font-size:12px">导言</line>"#.to_string();

    assert_eq!(
        writer.render_node(&node, true),
        r#"<p class="x" chapter="导言"><line>导言</line></p>"#
    );
    assert_eq!(
        writer.render_node(&node, false),
        r#"<p class="x" chapter="导言" style="color:red"><line style="font-size:12px">导言</line></p>"#
    );

    let mut image = ContentNode::new(1, NodeKind::Image, "");
    image.attributes = vec![("src".to_string(), "a.png".to_string())];
    image.chapter = Some(ChapterLabel::Cover);
    assert_eq!(
        writer.render_node(&image, true),
        r#"<img src="a.png" chapter="cover"/>"#
    );
}

#[test]
fn split_writes_one_fragment_per_chapter() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input_dir = input_dir_with(
        temp.path(),
        &[
            ("report.html", REPORT_HTML),
            ("plain.html", PLAIN_HTML),
            ("notes.txt", "not a document"),
        ],
    );
    let out_dir = temp.path().join("out");

    run(split_args(&input_dir, &out_dir)).expect("split succeeds");

    let introduction = fs::read_to_string(out_dir.join("report.html_导言.html"))
        .expect("introduction fragment");
    assert!(introduction.contains("这是导言正文"));
    assert!(introduction.contains(r#"chapter="导言""#));
    assert!(!introduction.contains("color:red"));
    assert!(!introduction.contains("<img"));

    let methods =
        fs::read_to_string(out_dir.join("report.html_方法.html")).expect("methods fragment");
    assert!(methods.contains("<table"));
    assert!(methods.contains("方法正文内容"));
    assert!(!out_dir.join("report.html_cover.html").exists());

    let manifest = latest_manifest(&out_dir);
    assert_eq!(manifest.status, "completed");
    assert_eq!(manifest.counts.document_count, 3);
    assert_eq!(manifest.counts.completed_count, 1);
    assert_eq!(manifest.counts.failed_count, 2);
    assert_eq!(manifest.counts.fragments_written, 2);

    let report = manifest
        .documents
        .iter()
        .find(|record| record.filename == "report.html")
        .expect("report record");
    assert_eq!(report.toc_index, Some(1));
    assert_eq!(report.dictionary_size, 2);
    let chapters = report
        .chapters
        .iter()
        .map(|range| (range.title.as_str(), range.start, range.end))
        .collect::<Vec<_>>();
    assert_eq!(chapters, vec![("导言", 4, 7), ("方法", 7, 10)]);

    let plain = manifest
        .documents
        .iter()
        .find(|record| record.filename == "plain.html")
        .expect("plain record");
    assert_eq!(plain.status, "failed");
    assert!(
        plain
            .failure_reason
            .as_deref()
            .unwrap_or_default()
            .contains("no table of contents found")
    );

    let notes = manifest
        .documents
        .iter()
        .find(|record| record.filename == "notes.txt")
        .expect("notes record");
    assert_eq!(notes.status, "failed");
}

#[test]
fn split_with_allow_list_hides_other_chapters_in_whole_output() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input_dir = input_dir_with(temp.path(), &[("report.html", REPORT_HTML)]);
    let out_dir = temp.path().join("out");
    let chapters_path = temp.path().join("chapters.json");
    fs::write(&chapters_path, r#"{"方法": true, "导言": false}"#).expect("write allow-list");

    let mut args = split_args(&input_dir, &out_dir);
    args.chapters = Some(chapters_path);
    args.output = OutputMode::Whole;
    run(args).expect("split succeeds");

    let whole = fs::read_to_string(out_dir.join("report.html.html")).expect("whole document");
    assert!(whole.contains(r#"style="color:red;display:none;""#));
    assert!(whole.contains(r#"<p chapter="方法">第二部分 方法</p>"#));

    let manifest = latest_manifest(&out_dir);
    let report = &manifest.documents[0];
    assert_eq!(report.status, "completed");
    assert_eq!(report.selected_chapters, Some(vec!["方法".to_string()]));
    assert_eq!(report.hidden_node_count, 7);
    assert_eq!(report.written_files.len(), 1);
}

#[test]
fn split_skips_document_when_allow_list_matches_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input_dir = input_dir_with(temp.path(), &[("report.html", REPORT_HTML)]);
    let out_dir = temp.path().join("out");
    let chapters_path = temp.path().join("chapters.json");
    fs::write(&chapters_path, r#"{"参考文献": true}"#).expect("write allow-list");

    let mut args = split_args(&input_dir, &out_dir);
    args.chapters = Some(chapters_path);
    run(args).expect("skipped documents do not fail the run");

    let manifest = latest_manifest(&out_dir);
    assert_eq!(manifest.counts.skipped_count, 1);
    assert_eq!(manifest.counts.fragments_written, 0);
    assert_eq!(manifest.documents[0].status, "skipped");
    assert!(!out_dir.join("report.html_方法.html").exists());
}

#[test]
fn split_fails_when_every_document_fails() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input_dir = input_dir_with(temp.path(), &[("plain.html", PLAIN_HTML)]);
    let out_dir = temp.path().join("out");

    let error = run(split_args(&input_dir, &out_dir)).expect_err("run fails");
    assert!(error.to_string().contains("every document failed"));

    let manifest = latest_manifest(&out_dir);
    assert_eq!(manifest.status, "failed");
    assert_eq!(manifest.counts.failed_count, 1);
}

#[test]
fn whole_output_writes_nested_paragraphs_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let writer = FragmentWriter::new().expect("writer");
    let nodes = parse_html_nodes("<p>前言</p><table><tr><td><p>唯一数据</p></td></tr></table>")
        .expect("parses");

    assert_eq!(nodes.len(), 3);
    assert!(!nodes[0].nested);
    assert!(!nodes[1].nested);
    assert!(nodes[2].nested);
    assert_eq!(nodes[2].raw_text, "唯一数据");

    let written = writer
        .write(&nodes, temp.path(), "table.html", OutputMode::Whole, &[])
        .expect("writes");
    let whole = fs::read_to_string(&written[0]).expect("whole document");
    assert_eq!(whole.matches("唯一数据").count(), 1);
    assert_eq!(whole.matches("前言").count(), 1);
}
