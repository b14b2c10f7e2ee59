use crate::commands::{print_json, Context};
use anyhow::Result;
use chatfilter_core::{Attribute, ValueType};
use clap::Args;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct AttributesArgs {}

#[derive(Debug, Serialize)]
struct AttributeDto {
    name: &'static str,
    #[serde(rename = "type")]
    value_type: ValueType,
}

pub fn list_attributes(ctx: &Context<'_>, _args: AttributesArgs) -> Result<()> {
    let items: Vec<AttributeDto> = Attribute::ALL
        .into_iter()
        .map(|attribute| AttributeDto {
            name: attribute.name(),
            value_type: attribute.value_type(),
        })
        .collect();

    if ctx.json {
        print_json(&items)?;
        return Ok(());
    }

    for item in items {
        println!("{:<28} {}", item.name, item.value_type);
    }
    Ok(())
}
