//! styledoc - inspect and round-trip styled XML documents

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use styledoc::dom::reader::read_file;
use styledoc::export::{ExportOptions, Exporter, XmlExporter};
use styledoc::{ElementKind, StyledDocument, build};

#[derive(Parser)]
#[command(name = "styledoc")]
#[command(version, about = "Styled XML document flattener", long_about = None)]
#[command(after_help = "EXAMPLES:
    styledoc dump a.xml b.xhtml        Print the styled runs of two documents
    styledoc dump --json a.xml         Same, as JSON
    styledoc roundtrip a.xml --pretty  Rebuild the source of a document")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every element and text run with its resolved style
    Dump {
        /// Input files, laid out one after another
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Emit JSON instead of an indented listing
        #[arg(long)]
        json: bool,
    },
    /// Flatten a document and write it back out as XML
    Roundtrip {
        /// Input file
        #[arg(value_name = "FILE")]
        file: String,

        /// Indent element children with tabs
        #[arg(long)]
        pretty: bool,
    },
}

/// One element of the dump.
#[derive(Serialize)]
struct Record {
    depth: usize,
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    font: String,
    font_size: f32,
    bold: bool,
    italic: bool,
    color: String,
    display: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    marker: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Dump { files, json } => dump(&files, json),
        Command::Roundtrip { file, pretty } => roundtrip(&file, pretty),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load(files: &[String]) -> Result<StyledDocument, String> {
    let sources = files
        .iter()
        .map(|path| read_file(path).map_err(|e| format!("{path}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    StyledDocument::from_specs(&build(&sources)).map_err(|e| e.to_string())
}

fn records(doc: &StyledDocument) -> Vec<Record> {
    use styledoc::style::ToCss;

    let resolver = doc.resolver();
    let mut out = Vec::with_capacity(doc.elements().len());
    let mut stack = vec![(doc.root(), 0)];
    while let Some((id, depth)) = stack.pop() {
        let element = &doc.elements()[id];
        let attrs = &element.attributes;
        let font = resolver.font(attrs);
        out.push(Record {
            depth,
            name: attrs.local_name().map(str::to_string),
            text: match &element.kind {
                ElementKind::Leaf { text } => Some(text.clone()),
                ElementKind::Branch { .. } => None,
            },
            font: font.family.clone(),
            font_size: font.size,
            bold: font.is_bold(),
            italic: font.is_italic(),
            color: resolver.color(attrs).to_css_string(),
            display: resolver.display(attrs).as_str(),
            marker: doc.list_marker(id),
        });
        stack.extend(element.children().iter().rev().map(|&c| (c, depth + 1)));
    }
    out
}

fn dump(files: &[String], json: bool) -> Result<(), String> {
    let doc = load(files)?;
    let records = records(&doc);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &records).map_err(|e| e.to_string())?;
        writeln!(out).map_err(|e| e.to_string())?;
        return Ok(());
    }

    for r in &records {
        let indent = "  ".repeat(r.depth);
        let label = match (&r.name, &r.text) {
            (_, Some(text)) => format!("{text:?}"),
            (Some(name), None) => format!("<{name}>"),
            (None, None) => "<#section>".to_string(),
        };
        let marker = r.marker.as_deref().map(|m| format!(" [{m}]")).unwrap_or_default();
        writeln!(
            out,
            "{indent}{label}{marker}  {} {}pt{}{} {} {}",
            r.font,
            r.font_size,
            if r.bold { " bold" } else { "" },
            if r.italic { " italic" } else { "" },
            r.color,
            r.display,
        )
        .map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn roundtrip(path: &str, pretty: bool) -> Result<(), String> {
    let doc = load(&[path.to_string()])?;
    let exporter = XmlExporter::with_config(ExportOptions::new().with_pretty(pretty));
    let stdout = io::stdout();
    exporter
        .export(&doc, &mut stdout.lock())
        .map_err(|e| e.to_string())
}
