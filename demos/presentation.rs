//=========================================================================
// Presentation Demo
//=========================================================================
//
// Two scenes cycling through the full frame loop:
//
//   Workshop: room and stair sprites, logo fade/drop, hammer pop-in with
//             a floating idle loop, then a push to Finale
//   Finale:   dims its own copy of the room, pulses a banner and pops
//             back to a freshly built Workshop
//
// Usage:
//   cargo run --example presentation               (opens a window)
//   cargo run --example presentation -- --headless (600 simulated frames)
//
// Set RUST_LOG=debug (or RUST_LOG=scene=info,engine=trace) to follow the
// lifecycle.
//
//=========================================================================

use kurbo::{Point, Vec2};
use log::info;
use stagecraft::prelude::*;

//=== Scene Keys ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Screen {
    Workshop,
    Finale,
}

impl SceneKey for Screen {}

//=== Assets ==============================================================

fn asset_source() -> StaticSource {
    StaticSource::new()
        .with("room.png", 1360, 640)
        .with("stair.png", 420, 500)
        .with("logo.png", 360, 120)
        .with("hammer.png", 96, 96)
        .with("banner.png", 600, 200)
}

/// Creates a sprite from a loaded texture under `parent`.
fn place(
    ctx: &mut HostContext<Screen>,
    parent: NodeId,
    name: &str,
    position: Point,
) -> Result<NodeId, SceneError> {
    let texture = ctx.assets.texture(name)?;
    let sprite = ctx.stage.create_sprite(texture);
    ctx.stage.add_child(parent, sprite)?;
    ctx.stage.node_mut(sprite)?.position = position;
    Ok(sprite)
}

//=== Workshop Scene ======================================================

struct Workshop {
    layers: SceneLayers,
}

impl Workshop {
    fn new(ctx: &mut HostContext<Screen>) -> Self {
        ctx.assets.add_all(["room.png", "stair.png", "logo.png", "hammer.png"]);
        Self {
            layers: SceneLayers::attach(ctx),
        }
    }
}

impl Scene<Screen> for Workshop {
    fn initialized(&mut self, ctx: &mut HostContext<Screen>) -> Result<(), SceneError> {
        let content = self.layers.content;
        let overlay = self.layers.overlay;

        place(ctx, content, "room.png", Point::ORIGIN)?;
        let stair = place(ctx, content, "stair.png", Point::new(830.0, 40.0))?;
        let logo = place(ctx, overlay, "logo.png", Point::new(32.0, -120.0))?;
        ctx.stage.node_mut(logo)?.alpha = 0.0;

        ctx.tasks.spawn(FadeIn::new(logo, 600.0));
        ctx.tasks.spawn(DropIn::new(logo, 600.0, -120.0, 5.0));

        let stair_size = ctx.stage.size_of(stair)?;
        let hammer_texture = ctx.assets.texture("hammer.png")?;
        let hammer_at = Point::new(830.0 + stair_size.width * 0.5, 40.0 + stair_size.height * 0.3);

        ctx.tasks.spawn(Delay::new(1000.0, move |frame| {
            let hammer = frame.stage.create_sprite(hammer_texture);
            frame.stage.add_child(overlay, hammer)?;
            let node = frame.stage.node_mut(hammer)?;
            node.position = hammer_at;
            node.anchor = Vec2::new(0.5, 0.5);
            node.set_uniform_scale(0.0);

            frame.spawn(ScaleEase::new(hammer, 600.0, CubicBezier::back_in_out()));
            frame.spawn(FloatLoop::new(hammer, 1500.0, 10.0));
            Ok(())
        }));

        let commands = ctx.commands();
        ctx.tasks.spawn(Delay::new(4000.0, move |_| {
            let _ = commands.send(DirectorCommand::Push(Screen::Finale));
            Ok(())
        }));

        info!("Workshop ready");
        Ok(())
    }
}

//=== Finale Scene ========================================================

struct Finale {
    layers: SceneLayers,
}

impl Finale {
    fn new(ctx: &mut HostContext<Screen>) -> Self {
        ctx.assets.add_all(["room.png", "banner.png"]);
        Self {
            layers: SceneLayers::attach(ctx),
        }
    }
}

impl Scene<Screen> for Finale {
    fn initialized(&mut self, ctx: &mut HostContext<Screen>) -> Result<(), SceneError> {
        place(ctx, self.layers.content, "room.png", Point::ORIGIN)?;
        ctx.tasks
            .spawn(FadeOut::new(self.layers.content, 1000.0).with_floor(0.3));

        let banner = place(ctx, self.layers.overlay, "banner.png", Point::new(680.0, 320.0))?;
        ctx.stage.node_mut(banner)?.anchor = Vec2::new(0.5, 0.5);
        ctx.tasks
            .spawn(HeartBeat::new(banner, 400.0, CubicBezier::sine_in_out()));

        let commands = ctx.commands();
        ctx.tasks.spawn(Delay::new(3000.0, move |_| {
            let _ = commands.send(DirectorCommand::Pop);
            Ok(())
        }));

        info!("Finale ready");
        Ok(())
    }
}

//=== Entry Point =========================================================

fn main() -> Result<(), EngineError> {
    env_logger::init();

    let mut engine = EngineBuilder::<Screen>::new()
        .with_title("Stagecraft Presentation")
        .with_asset_source(asset_source())
        .build()
        .init(|director, ctx| {
            director.register(Screen::Workshop, Workshop::new);
            director.register(Screen::Finale, Finale::new);
            director.push(Screen::Workshop, ctx)
        })?;

    if std::env::args().any(|arg| arg == "--headless") {
        const FRAMES: u32 = 600;
        engine.resize(1360, 640);
        for _ in 0..FRAMES {
            engine.frame(1000.0 / 60.0)?;
        }
        info!(
            "Headless run finished: {} frames, scene {:?}, {} tasks live",
            engine.frames(),
            engine.director().active_key(),
            engine.context().tasks.len()
        );
        return Ok(());
    }

    engine.run()
}
