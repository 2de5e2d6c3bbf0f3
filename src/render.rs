use chip8vm::FrameView;

pub const LIT: char = '#';
pub const UNLIT: char = '.';

/// Frame as lines of `#` and `.`, every pixel printed as a `scale` x `scale` block
pub fn ascii(frame: FrameView<'_>, scale: usize) -> String {
    let mut out = String::new();
    for row in frame.iter_pixelwise_scaled(scale.max(1)) {
        out.extend(row.map(|lit| if lit { LIT } else { UNLIT }));
        out.push('\n');
    }
    out
}
