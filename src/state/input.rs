/// Single editable text value backing a prompt or form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
}

impl TextField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.value.push_str(s);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
