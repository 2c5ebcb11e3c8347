use core::fmt::Write;

/// Printed once when a program starts.
pub const BANNER: &str = "\r\nHELLO WORLD\r\n";

/// Byte-oriented text output, e.g. a serial port.
pub trait Sink {
    fn start(&mut self);

    fn put_byte(&mut self, byte: u8);

    fn put_str(&mut self, text: &str) {
        for &byte in text.as_bytes() {
            self.put_byte(byte);
        }
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn start(&mut self) {
        (**self).start()
    }

    fn put_byte(&mut self, byte: u8) {
        (**self).put_byte(byte)
    }

    fn put_str(&mut self, text: &str) {
        (**self).put_str(text)
    }
}

/// Emit `ACC=<value>\r\n`.
pub fn report<S: Sink + ?Sized>(sink: &mut S, value: u32) {
    let mut line: heapless::String<24> = heapless::String::new();
    // "ACC=" + ten digits + "\r\n" always fits.
    if write!(line, "ACC={}\r\n", value).is_ok() {
        sink.put_str(&line);
    }
}
