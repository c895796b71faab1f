//! Format layer creation macro

/// Apply the shared display options to a format layer and box it.
///
/// Disabling timestamps changes the layer type, so both arms are boxed.
macro_rules! boxed_fmt_layer {
    ($layer:expr, $display:expr) => {{
        let display = $display;
        let layer = $layer
            .with_ansi(display.colors)
            .with_target(display.target)
            .with_file(display.source)
            .with_line_number(display.source)
            .with_thread_ids(display.thread_ids)
            .with_thread_names(display.thread_names);

        if display.time {
            layer.boxed()
        } else {
            layer.without_time().boxed()
        }
    }};
}
