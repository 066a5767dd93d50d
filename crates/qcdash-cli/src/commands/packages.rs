//! Packages command - resolve the Type → Package cascade.

use colored::Colorize;
use qcdash::cascade;

pub fn run(assay_type: Option<String>, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let Some(assay_type) = assay_type else {
        let types = cascade::types();
        if json_output {
            println!("{}", serde_json::to_string_pretty(&types)?);
        } else {
            println!("{}", "Types:".yellow().bold());
            for t in types {
                println!("  {}", t);
            }
        }
        return Ok(());
    };

    let packages = cascade::packages_for(&assay_type).ok_or_else(|| {
        format!(
            "Unknown type: '{}'. Run 'qcdash packages' to list types.",
            assay_type
        )
    })?;

    if json_output {
        let output = serde_json::json!({
            "type": assay_type,
            "packages": packages,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} {}",
            "Packages for".cyan().bold(),
            assay_type.white().bold()
        );
        println!("  {}", qcdash::ALL.dimmed());
        for package in packages {
            println!("  {}", package);
        }
    }

    Ok(())
}
