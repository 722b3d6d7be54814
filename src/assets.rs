//! Stylesheets of the built-in simulations.

/// Default cell size of the grid overlay, in CSS pixels.
pub const DEFAULT_GRID_SIZE: u32 = 15;

/// Baseline grid overlay with square cells of `size` pixels.
#[must_use]
pub fn grid(size: u32) -> String {
    format!(
        "html {{
  position: relative;
}}
html::after {{
  content: '';
  position: absolute;
  inset: 0;
  min-height: 100%;
  z-index: 2147483647;
  pointer-events: none;
  background-image:
    linear-gradient(to right, rgba(255, 0, 128, 0.25) 1px, transparent 1px),
    linear-gradient(to bottom, rgba(0, 128, 255, 0.25) 1px, transparent 1px);
  background-size: {size}px {size}px;
}}
"
    )
}

/// Outlines every element so box boundaries become visible.
pub const LAYOUT: &str = "* { outline: 1px solid rgba(255, 0, 0, 0.6) !important; }
* * { outline-color: rgba(0, 160, 0, 0.6) !important; }
* * * { outline-color: rgba(0, 0, 255, 0.6) !important; }
* * * * { outline-color: rgba(255, 0, 255, 0.6) !important; }
* * * * * { outline-color: rgba(0, 200, 200, 0.6) !important; }
* * * * * * { outline-color: rgba(255, 160, 0, 0.6) !important; }
";

/// Stress styles: long words, forced wrapping and oversized text expose
/// layouts that only work with ideal content.
pub const HOSTILE: &str = "html { font-size: 125% !important; }
* { letter-spacing: 0.12em !important; word-spacing: 0.16em !important; line-height: 1.5 !important; }
p, li, td, th, dd, dt, label, a, button, span { hyphens: none !important; overflow-wrap: normal !important; }
img, video, iframe, canvas, svg { min-width: 120% !important; }
:is(h1, h2, h3, h4, h5, h6)::after { content: ' Donaudampfschifffahrtsgesellschaftskapitän'; }
";

/// Highlights common accessibility mistakes directly in the page.
pub const A11YCSS: &str = "img:not([alt]), area:not([alt]), input[type='image']:not([alt]) {
  outline: 4px solid #d0021b !important;
}
img[alt=''] { outline: 4px dashed #f5a623 !important; }
a:not([href]), a[href=''], a[href='#'] { outline: 4px solid #f5a623 !important; }
a:empty, button:empty { outline: 4px solid #d0021b !important; }
a[target='_blank']:not([rel~='noopener']) { outline: 4px dashed #f5a623 !important; }
input:not([id]):not([aria-label]):not([aria-labelledby]):not([type='hidden']):not([type='submit']):not([type='button']) {
  outline: 4px solid #d0021b !important;
}
label:not([for]) { outline: 4px dashed #f5a623 !important; }
[tabindex]:not([tabindex='0']):not([tabindex='-1']) { outline: 4px solid #d0021b !important; }
html:not([lang]), html[lang=''] { border: 8px solid #d0021b !important; }
[role='button']:not([tabindex]) { outline: 4px dashed #f5a623 !important; }
[aria-hidden='true'] :is(a, button, input, select, textarea) { outline: 4px solid #d0021b !important; }
";
