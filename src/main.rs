//! `tilegpu-trace`: run the index buffer lifecycle against a headless wgpu
//! device and log every step.
//!
//! Usage: `tilegpu-trace [options.toml]`. Set `RUST_LOG=trace` to see
//! individual binding calls and elisions.

use std::path::Path;

use tilegpu::gpu::wgpu_device::WgpuDevice;
use tilegpu::options::Options;
use tilegpu::{Context, IndexBuffer, TileGpuError, TriangleIndexArray};

fn run(options: &Options) -> Result<(), TileGpuError> {
    let device = pollster::block_on(WgpuDevice::request(&options.context))?;
    let mut ctx = Context::with_options(device, &options.context);

    let mut tile = TriangleIndexArray::from_elements(&[[0, 1, 2], [2, 1, 3]]);
    let mut fill = IndexBuffer::new(&mut ctx, &mut tile, false)?;
    log::info!("static buffer: {fill:?}, source released: {}", tile.is_released());

    let mut labels = TriangleIndexArray::from_elements(&[[0, 1, 2], [2, 3, 0]]);
    let mut symbols = IndexBuffer::new(&mut ctx, &mut labels, true)?;
    log::info!("dynamic buffer: {symbols:?}");

    let placed = TriangleIndexArray::from_elements(&[[4, 5, 6]]);
    symbols.update_data(&mut ctx, &placed)?;
    log::info!(
        "updated dynamic buffer in place: {} bytes retained",
        symbols.retained_bytes().map_or(0, <[u8]>::len)
    );

    for _ in 0..3 {
        fill.bind(&mut ctx)?;
        symbols.bind(&mut ctx)?;
    }
    ctx.device().submit();

    if let Err(e) = fill.update_data(&mut ctx, &placed) {
        log::info!("static update rejected as expected: {e}");
    }

    fill.destroy(&mut ctx);
    symbols.destroy(&mut ctx);
    fill.destroy(&mut ctx);
    log::info!("destroyed both buffers");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let options = match std::env::args().nth(1) {
        Some(path) => match Options::load(Path::new(&path)) {
            Ok(options) => options,
            Err(e) => {
                log::error!("Failed to load options '{path}': {e}");
                std::process::exit(2);
            }
        },
        None => Options::default(),
    };

    if let Err(e) = run(&options) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
