// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use jiff::Zoned;

#[derive(Debug, Clone)]
pub enum Clock {
    DefaultClock,
    #[cfg(test)]
    ManualClock(std::sync::Arc<std::sync::Mutex<Zoned>>),
}

impl Clock {
    pub fn now(&self) -> Zoned {
        match self {
            Clock::DefaultClock => Zoned::now(),
            #[cfg(test)]
            Clock::ManualClock(now) => now.lock().unwrap().clone(),
        }
    }

    #[cfg(test)]
    pub fn manual(now: Zoned) -> Clock {
        Clock::ManualClock(std::sync::Arc::new(std::sync::Mutex::new(now)))
    }

    #[cfg(test)]
    pub fn set_now(&self, new_time: Zoned) {
        if let Clock::ManualClock(now) = self {
            *now.lock().unwrap() = new_time;
        }
    }
}
