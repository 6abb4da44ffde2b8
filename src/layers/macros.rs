//! Macro generating the [`Layer`](crate::layers::base::Layer) accessors for
//! layers that keep their state in a `LayerProperties` field.

#[macro_export]
macro_rules! impl_layer {
    ($properties_field:ident) => {
        fn id(&self) -> &str {
            &self.$properties_field.id
        }

        fn kind(&self) -> $crate::layers::base::LayerKind {
            self.$properties_field.kind
        }

        fn is_visible(&self) -> bool {
            self.$properties_field.visible
        }

        fn set_visible(&mut self, visible: bool) {
            self.$properties_field.visible = visible;
        }

        fn is_interactive(&self) -> bool {
            self.$properties_field.interactive
        }
    };
}
