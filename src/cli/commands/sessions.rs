use super::{create_spinner, Context};
use crate::oci::resolve_bastion;
use crate::session::{list_active_sessions, render_listing};
use crate::Result;

pub async fn execute(ctx: &Context) -> Result<()> {
    let gateway = ctx.gateway()?;

    let spinner = create_spinner("Listing sessions...");
    let listed = async {
        let bastion = resolve_bastion(&ctx.resolver(), &ctx.selectors).await?;
        let sessions = list_active_sessions(&gateway, &bastion.bastion_id).await?;
        Ok::<_, crate::BastionError>((bastion, sessions))
    }
    .await;
    spinner.finish_and_clear();
    let (bastion, sessions) = listed?;

    println!("Active bastion sessions on {}:", bastion.bastion_name);
    println!();
    print!("{}", render_listing(&sessions));

    Ok(())
}
