//! Account command handlers: user and conversion types.

use anyhow::{Result, bail};
use conversiontools::ClientBuilder;
use conversiontools::conversions::{self, ConversionKind, ConversionSpec, OptionKind};

pub async fn run_user_command(builder: ClientBuilder) -> Result<()> {
    let client = builder.build()?;
    let user = client.user().await?;
    println!("email = {}", user.email);
    if let Some(limits) = client.rate_limits() {
        if let Some(daily) = limits.daily {
            println!("daily = {}/{} remaining", daily.remaining, daily.limit);
        }
        if let Some(monthly) = limits.monthly {
            println!("monthly = {}/{} remaining", monthly.remaining, monthly.limit);
        }
        if let Some(file_size) = limits.file_size {
            println!("file_size_limit = {file_size}");
        }
    }
    Ok(())
}

pub async fn run_remote_types_command(builder: ClientBuilder) -> Result<()> {
    let client = builder.build()?;
    let config = client.api_config().await?;
    for conversion in &config.conversions {
        println!("{:<40} {}", conversion.conversion_type, conversion.title);
    }
    Ok(())
}

/// Lists the built-in catalog, or one entry's options.
pub fn run_types_command(conversion_type: Option<&str>) -> Result<()> {
    let Some(conversion_type) = conversion_type else {
        for spec in conversions::known_conversions() {
            println!("{}", spec.conversion_type);
        }
        return Ok(());
    };

    match conversions::lookup(conversion_type) {
        ConversionKind::Known(spec) => {
            print_spec(spec);
            Ok(())
        }
        ConversionKind::Unknown(name) => {
            bail!("{name} is not in the built-in catalog; try --remote")
        }
    }
}

fn print_spec(spec: &ConversionSpec) {
    println!("{}", spec.conversion_type);
    for field in spec.fields {
        let kind = match field.kind {
            OptionKind::Boolean => "boolean".to_string(),
            OptionKind::Integer => "integer".to_string(),
            OptionKind::Text => "string".to_string(),
            OptionKind::OneOf(values) => values.join(" | "),
        };
        let required = if field.required { " (required)" } else { "" };
        println!("  {:<24} {kind}{required}", field.name);
    }
}
