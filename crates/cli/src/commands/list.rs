use colored::*;
use yake_core::configs::document::TargetType;
use yake_core::results::TargetListing;

pub fn print_listing(listing: &TargetListing) {
    let heading = if listing.path.is_empty() {
        "Targets".to_string()
    } else {
        format!("Targets in {}", listing.path)
    };
    println!("{}", heading.bold().underline());
    if !listing.doc.is_empty() {
        println!("  {}", listing.doc.dimmed());
    }

    if listing.children.is_empty() {
        println!("  {}", "No targets found".dimmed());
        return;
    }

    let width = listing
        .children
        .iter()
        .map(|child| child.path.len())
        .max()
        .unwrap_or(0);

    for child in &listing.children {
        let name = format!("{:width$}", child.path, width = width);
        let name = match child.target_type {
            TargetType::Callable => name.blue().bold(),
            TargetType::Group => name.cyan(),
        };
        let kind = match child.target_type {
            TargetType::Callable => "",
            TargetType::Group => " [group]",
        };
        println!("  {}  {}{}", name, child.doc, kind.dimmed());
    }
}
