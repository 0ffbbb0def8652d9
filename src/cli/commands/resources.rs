use super::Context;
use crate::oci::resolver::require_tenancy;
use crate::oci::{resolve_compartment, TargetResolver};
use crate::Result;

/// List compartment names in the tenancy, sorted.
pub async fn compartments(ctx: &Context) -> Result<()> {
    let tenancy_id = require_tenancy(&ctx.selectors)?;
    let resolver = ctx.resolver();

    let tenancy_name = resolver.tenancy_name(tenancy_id).await?;
    let compartments = resolver.list_compartments(tenancy_id).await?;

    println!("Current tenant: {}", tenancy_name);
    println!();
    println!("Compartments:");
    for name in compartments.keys() {
        println!("  {}", name);
    }

    Ok(())
}

/// List bastion names in the selected compartment, sorted.
pub async fn bastions(ctx: &Context) -> Result<()> {
    let resolver = ctx.resolver();
    let compartment = resolve_compartment(&resolver, &ctx.selectors).await?;
    let bastions = resolver.list_bastions(&compartment.compartment_id).await?;

    println!("Bastions in compartment {}:", compartment.compartment_name);
    if bastions.is_empty() {
        println!("  (none)");
    }
    for name in bastions.keys() {
        println!("  {}", name);
    }

    Ok(())
}
