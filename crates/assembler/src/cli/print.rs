use assemblerapp::commands::{CmdMessage, MessageLevel, NodeListing};
use assemblerapp::encode::DocumentEncoder;
use assemblerapp::model::Entry;
use colored::Colorize;

const TITLE_WIDTH: usize = 24;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// Warnings and errors only, on stderr, so stdout stays a clean document.
pub(super) fn print_warnings(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Warning => eprintln!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
            MessageLevel::Info | MessageLevel::Success => {}
        }
    }
}

pub(super) fn print_document(text: &str) {
    if !text.is_empty() {
        println!("{}", text);
    }
}

pub(super) fn print_listing(nodes: &[NodeListing]) {
    if nodes.is_empty() {
        println!("No nodes found.");
        return;
    }

    let encoder = DocumentEncoder::compact();
    for (i, listing) in nodes.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", listing.node.title().bold());
        for attr in &listing.attributes {
            let value = encoder
                .encode_value(attr.value())
                .unwrap_or_else(|e| format!("<{}>", e));
            let tags = flag_tags(attr);
            if tags.is_empty() {
                println!("    {:<width$} {}", attr.title(), value, width = TITLE_WIDTH);
            } else {
                println!(
                    "    {:<width$} {} {}",
                    attr.title(),
                    value,
                    tags.dimmed(),
                    width = TITLE_WIDTH
                );
            }
        }
    }
}

fn flag_tags(entry: &Entry) -> String {
    let Some(binding) = entry.attribute_binding() else {
        return String::new();
    };
    let mut tags = Vec::new();
    if binding.hidden {
        tags.push("[hidden]");
    }
    if !binding.keyable {
        tags.push("[non-keyable]");
    }
    if binding.connected {
        tags.push("[connected]");
    }
    tags.join(" ")
}
