//! Carousel walkthrough
//!
//! Builds a three-slide carousel with tabs, lets it rotate on the virtual
//! clock, hovers it, then takes over with the rotation control.
//!
//! Run with `RUST_LOG=trellis_widgets=debug cargo run --example carousel`.

use trellis::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Trellis {}", trellis::VERSION);

    let mut ctx = Context::new();
    ctx.subscribe(|notification, tree| {
        let id = tree.get_attribute(notification.target, "id").unwrap_or("?");
        tracing::info!("{:>18} on {}", notification.name(), id);
    });

    let root = ctx.create_element("trellis-carousel");
    ctx.set_attribute(root, "automatic-rotation", "")?;
    ctx.set_attribute(root, "automatic-rotation-interval-time", "1000")?;
    ctx.set_attribute(root, "infinite-rotation", "")?;

    let control = ctx.create_element("trellis-carousel-rotation-control");
    ctx.append_child(root, control)?;

    let slides = ctx.create_element("trellis-carousel-slides");
    let tabs = ctx.create_element("trellis-carousel-tabs");
    for i in 0..3 {
        let slide = ctx.create_element("trellis-carousel-slide");
        let tab = ctx.create_element("trellis-carousel-tab");
        if i == 0 {
            ctx.set_attribute(slide, "active", "")?;
            ctx.set_attribute(tab, "active", "")?;
        }
        ctx.append_child(slides, slide)?;
        ctx.append_child(tabs, tab)?;
    }
    ctx.append_child(root, slides)?;
    ctx.append_child(root, tabs)?;
    ctx.append_child(ctx.document(), root)?;

    tracing::info!("-- rotating");
    ctx.advance(2500);
    tracing::info!("active slide: {:?}", carousel::active_index(&ctx, root));

    tracing::info!("-- hovered");
    ctx.pointer_enter(root);
    ctx.advance(3000);
    ctx.pointer_leave(root);

    tracing::info!("-- rotation control");
    ctx.click(control);
    ctx.advance(3000);
    tracing::info!(
        "rotating: {}, control label: {:?}",
        carousel::is_rotating(&ctx, root),
        ctx.get_attribute(control, "aria-label")
    );

    tracing::info!("{} notifications", ctx.notifications().log().len());
    Ok(())
}
