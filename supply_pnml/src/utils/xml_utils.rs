use std::io::Write;

use quick_xml::Writer;

use crate::petri_net::export_pnml::PnmlOptions;

/// Destination of a PNML document: a [`quick_xml::Writer`] created for it, or one borrowed
/// from the caller
#[allow(missing_debug_implementations)]
pub enum XMLWriterWrapper<'a, W> {
    /// Writer created for this document
    Owned(Writer<W>),
    /// Writer of the caller, which keeps its own indentation
    Ref(&'a mut Writer<W>),
}

impl<W: Write> XMLWriterWrapper<'_, W> {
    /// Owned writer formatted the way `options` ask for
    ///
    /// `options.indent == 0` puts the whole document on one line.
    pub fn for_pnml(w: W, options: &PnmlOptions) -> Self {
        Self::Owned(match options.indent {
            0 => Writer::new(w),
            indent => Writer::new_with_indent(w, b' ', indent),
        })
    }
}

impl<W> AsMut<Writer<W>> for XMLWriterWrapper<'_, W> {
    fn as_mut(&mut self) -> &mut Writer<W> {
        match self {
            XMLWriterWrapper::Owned(w) => w,
            XMLWriterWrapper::Ref(w) => w,
        }
    }
}

/// Unindented writer
impl<W: Write> From<W> for XMLWriterWrapper<'_, W> {
    fn from(w: W) -> Self {
        Self::Owned(Writer::new(w))
    }
}

impl<'a, W> From<&'a mut Writer<W>> for XMLWriterWrapper<'a, W> {
    fn from(w: &'a mut Writer<W>) -> Self {
        Self::Ref(w)
    }
}
